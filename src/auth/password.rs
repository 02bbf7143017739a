use crate::error::AppError;
use bcrypt::{hash, verify};

// Cost 10 keeps login latency tolerable while staying above bcrypt's floor.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "correct horse battery";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong password", &hashed).unwrap());
    }

    #[test]
    fn test_plaintext_is_not_stored() {
        let password = "super_secret_1";
        let hashed = hash_password(password).unwrap();
        assert_ne!(hashed, password);
        assert!(hashed.starts_with("$2"));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("anything", "not-a-bcrypt-hash") {
            Err(AppError::Internal(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {
                // bcrypt may also report a malformed hash as a plain mismatch.
            }
            Ok(true) => panic!("verification must not succeed for a malformed hash"),
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
}
