//! bcrypt-backed [`PasswordHasher`] adapter.
//!
//! bcrypt is CPU bound, so both hashing and verification run on Tokio's
//! blocking pool to keep request workers responsive.

use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

/// Lowest cost bcrypt accepts; only suitable for tests.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Password hasher using bcrypt with a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptPasswordHasher {
    /// Hasher with an explicit cost, clamped to bcrypt's accepted range.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, 31),
        }
    }

    /// Configured cost factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

fn join_error(error: task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hashing(format!("hashing task failed: {error}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let cost = self.cost;
        let plaintext = zeroize::Zeroizing::new(password.expose().to_owned());
        task::spawn_blocking(move || {
            bcrypt::hash(plaintext.as_bytes(), cost)
                .map(PasswordHash::new)
                .map_err(|err| PasswordHasherError::hashing(err.to_string()))
        })
        .await
        .map_err(join_error)?
    }

    async fn verify(
        &self,
        candidate: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let candidate = zeroize::Zeroizing::new(candidate.to_owned());
        let stored = hash.as_str().to_owned();
        task::spawn_blocking(move || match bcrypt::verify(candidate.as_bytes(), &stored) {
            Ok(matches) => Ok(matches),
            // A malformed stored hash can never match; treat it as a mismatch.
            Err(bcrypt::BcryptError::InvalidHash(_) | bcrypt::BcryptError::InvalidPrefix(_)) => {
                Ok(false)
            }
            Err(err) => Err(PasswordHasherError::hashing(err.to_string())),
        })
        .await
        .map_err(join_error)?
    }
}
