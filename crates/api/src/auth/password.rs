//! Argon2id password hashing, verification, and strength validation.
//!
//! Hashes are stored in PHC string format so the algorithm parameters and
//! salt travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(false)` on a mismatch; `Err` only for a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check sign-up password rules: minimum length, mixed case, a digit and a
/// symbol. Returns every failed rule as a form message.
pub fn validate_password_strength(password: &str) -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        failures.push(format!(
            "The password field must be at least {MIN_PASSWORD_LEN} characters."
        ));
    }
    if !(password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase)) {
        failures.push(
            "The password field must contain at least one uppercase and one lowercase letter."
                .to_string(),
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("The password field must contain at least one number.".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        failures.push("The password field must contain at least one symbol.".to_string());
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("Correct-Horse-9").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Correct-Horse-9", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn strong_password_passes() {
        assert!(validate_password_strength("Sup3r$ecret").is_ok());
    }

    #[test]
    fn weak_password_lists_every_failure() {
        let failures = validate_password_strength("short").unwrap_err();
        assert_eq!(failures.len(), 4);
        assert!(failures[0].contains("at least 8 characters"));
    }

    #[test]
    fn missing_symbol_only() {
        let failures = validate_password_strength("Password123").unwrap_err();
        assert_eq!(
            failures,
            vec!["The password field must contain at least one symbol.".to_string()]
        );
    }
}
