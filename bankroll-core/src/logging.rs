//! Tracing subscriber setup
//!
//! The crate emits `tracing` events for entity lifecycle changes and
//! rejected mutations. Events carry identifiers and kinds only: no
//! amounts, balances, credentials, names or email addresses are logged.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

/// Install a global fmt subscriber filtered by `filter`
///
/// An unparsable filter falls back to the default. Returns `false` if a
/// global subscriber was already installed, in which case nothing changes.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init("debug");
        assert!(!init("not a [valid filter"));
        assert!(!init("info"));
    }
}
