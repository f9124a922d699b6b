use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use super::errors::PasswordError;

type HmacSha256 = Hmac<Sha256>;

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
/// When a pepper is configured, passwords are keyed through HMAC-SHA256
/// before hashing, so a leaked hash database alone is not enough for an
/// offline brute-force attack.
pub struct PasswordHasher {
    pepper: Option<String>,
}

impl PasswordHasher {
    /// Argon2 tuning, adjust to server hardware.
    const TIME_COST: u32 = 3;
    const MEMORY_KIB: u32 = 64 * 1024;
    const PARALLELISM: u32 = 2;
    const OUTPUT_LEN: usize = 32;

    /// Create a new password hasher instance.
    ///
    /// # Arguments
    /// * `pepper` - Optional server-side secret mixed into every password.
    ///   An empty string is treated as no pepper.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            pepper: pepper.filter(|p| !p.is_empty()),
        }
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with random salt generation. The pepper, when set, is
    /// applied via HMAC-SHA256 before the memory-hard pass.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self
            .argon2()
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        argon2
            .hash_password(self.apply_pepper(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        let argon2 = self
            .argon2()
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

        Ok(argon2
            .verify_password(self.apply_pepper(password).as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn argon2(&self) -> Result<Argon2<'static>, argon2::Error> {
        let params = Params::new(
            Self::MEMORY_KIB,
            Self::TIME_COST,
            Self::PARALLELISM,
            Some(Self::OUTPUT_LEN),
        )?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    // HMAC-SHA256 keyed by the pepper; the pepper is a secret key, not a salt.
    fn apply_pepper(&self, password: &str) -> String {
        match &self.pepper {
            Some(pepper) => {
                let mut mac = HmacSha256::new_from_slice(pepper.as_bytes())
                    .expect("HMAC can take key of any size");
                mac.update(password.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
            None => password.to_string(),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(None);
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_and_verify_with_pepper() {
        let hasher = PasswordHasher::new(Some("site-wide-secret".to_string()));
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_pepper_changes_preimage() {
        let peppered = PasswordHasher::new(Some("site-wide-secret".to_string()));
        let plain = PasswordHasher::new(None);
        let password = "my_secure_password";

        // A hash produced with a pepper must not verify without it.
        let hash = peppered.hash(password).expect("Failed to hash password");
        assert!(!plain
            .verify(password, &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_empty_pepper_is_no_pepper() {
        let hasher = PasswordHasher::new(Some(String::new()));
        let plain = PasswordHasher::new(None);

        let hash = hasher.hash("password123").expect("Failed to hash password");
        assert!(plain
            .verify("password123", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_embeds_argon2id_params() {
        let hasher = PasswordHasher::new(None);
        let hash = hasher.hash("password123").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=2"));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new(None);
        let result = hasher.verify("password", "invalid_hash");
        assert!(result.is_err());
    }
}
