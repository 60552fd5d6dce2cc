use crate::error::{AppError, Result};
use rand::Rng;

pub const CODE_LEN: usize = 6;

/// Generate a 6-digit numeric one-time code.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Codes are stored hashed, same as passwords.
pub fn hash_code(code: &str) -> Result<String> {
    bcrypt::hash(code, bcrypt::DEFAULT_COST).map_err(|_| AppError::InternalError)
}

pub fn verify_code(code: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(code, hash).map_err(|_| AppError::InternalError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        for _ in 0..20 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_hash_round_trip() {
        let code = generate_code();
        let hash = hash_code(&code).unwrap();
        assert!(verify_code(&code, &hash).unwrap());
        assert!(!verify_code("000000", &hash).unwrap() || code == "000000");
    }
}
