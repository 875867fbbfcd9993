// src/services/passwords.rs
// DOCUMENTATION: Argon2id password hashes
// PURPOSE: Stored as PHC strings (`$argon2id$v=19$...`), so the parameters
// travel with each hash; raw passwords never persist

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use crate::errors::TravelogError;

#[cfg(not(test))]
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

// Minimum cost keeps the test suite fast; verification reads the cost from the hash
#[cfg(test)]
fn hasher() -> Argon2<'static> {
    use argon2::{Algorithm, Params, Version};

    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .unwrap_or_default();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, TravelogError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| TravelogError::PasswordHash(e.to_string()))?;

    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            TravelogError::PasswordHash(e.to_string())
        })
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Stored password hash is not a valid PHC string: {}", e);
            return false;
        }
    };

    hasher().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("test_password").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("test_password"));
        assert!(verify_password("test_password", &stored));
        assert!(!verify_password("wrong_password", &stored));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let salt = SaltString::encode_b64(b"fixed-salt-bytes").unwrap();
        let stored = Argon2::default()
            .hash_password(b"test_password", &salt)
            .unwrap()
            .to_string();
        assert!(verify_password("test_password", &stored));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "sha256$salt$abc"));
        assert!(!verify_password("anything", "$argon2id$v=19$garbage"));
    }
}
