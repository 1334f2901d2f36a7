//! Argon2id password hashing adapter

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::ports::PasswordHasher;

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// Salt length in bytes
const SALT_LEN: usize = 16;

/// Argon2id cost parameters
///
/// Missing fields fall back to the defaults when read from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

impl Argon2Params {
    /// Cheapest parameters Argon2 accepts, for tests and CI
    pub fn minimal() -> Self {
        Self {
            time_cost: 1,
            memory_cost: 256,
            parallelism: 1,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

/// [`PasswordHasher`] backed by Argon2id, producing PHC strings
/// (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Argon2Params,
}

impl Argon2PasswordHasher {
    /// Create a hasher, rejecting parameters Argon2 cannot use
    pub fn new(params: Argon2Params) -> Result<Self> {
        Self::build_params(&params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    fn build_params(params: &Argon2Params) -> Result<Params> {
        Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(params.hash_len as usize),
        )
        .map_err(|e| Error::hashing(format!("Invalid argon2 params: {}", e)))
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Self::build_params(&self.params)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Argon2Params::default(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, raw: &[u8]) -> Result<String> {
        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| Error::hashing(format!("Failed to encode salt: {}", e)))?;

        let hash = self
            .argon2()?
            .hash_password(raw, &salt)
            .map_err(|e| Error::hashing(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, raw: &[u8], hashed: &str) -> bool {
        // Cost and salt come from the PHC string, not from our params
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        Argon2::default().verify_password(raw, &parsed).is_ok()
    }
}
