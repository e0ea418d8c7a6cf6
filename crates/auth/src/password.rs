//! bcrypt password hashing.
//!
//! Hashing is deliberately slow; async callers should run it on a blocking pool.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plain, self.cost).map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a bcrypt hash.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(plain, hash).map_err(|e| PasswordError::Hash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(4).unwrap();
        let hash = hasher.hash("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hasher.verify("secret123", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn cost_out_of_range_is_rejected() {
        assert_eq!(PasswordHasher::new(3), Err(PasswordError::InvalidCost(3)));
        assert_eq!(PasswordHasher::new(32), Err(PasswordError::InvalidCost(32)));
    }

    #[test]
    fn verify_against_non_hash_is_an_error() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(hasher.verify("x", "not-a-bcrypt-hash").is_err());
    }
}
