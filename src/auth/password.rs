//! Password hashing and verification (bcrypt).

use crate::Result;

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A stored value that is not a bcrypt hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    match bcrypt::verify(password, hash) {
        Ok(valid) => Ok(valid),
        Err(bcrypt::BcryptError::InvalidHash(_))
        | Err(bcrypt::BcryptError::InvalidPrefix(_))
        | Err(bcrypt::BcryptError::InvalidCost(_))
        | Err(bcrypt::BcryptError::InvalidBase64(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
