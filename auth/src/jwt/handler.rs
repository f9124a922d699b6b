use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow services to define their own token payload.
/// Uses HS256 (HMAC with SHA-256) with a single process-wide secret.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    /// - The secret is loaded once at startup and never rotated at runtime
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Validates both the signature and the `exp` claim. Every failure mode
    /// maps to the same `InvalidToken` error so callers cannot probe which
    /// check rejected the token.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch, expired, or malformed token
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let validation = Validation::new(self.algorithm);

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| JwtError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::jwt::claims::AccessClaims;
    use crate::jwt::claims::RefreshClaims;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        role: String,
        exp: i64,
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let claims = TestClaims {
            sub: "user123".to_string(),
            role: "user".to_string(),
            exp: future_exp(),
        };

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let claims = TestClaims {
            sub: "user123".to_string(),
            role: "user".to_string(),
            exp: future_exp(),
        };

        let token = handler1.encode(&claims).expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_same_error_as_bad_signature() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let claims = TestClaims {
            sub: "user123".to_string(),
            role: "user".to_string(),
            exp: chrono::Utc::now().timestamp() - 600,
        };

        let token = handler.encode(&claims).expect("Failed to encode token");

        // Expired and forged tokens must be indistinguishable to callers.
        let expired = handler.decode::<TestClaims>(&token).unwrap_err();
        let forged = handler.decode::<TestClaims>("a.b.c").unwrap_err();
        assert_eq!(expired.to_string(), forged.to_string());
    }

    #[test]
    fn test_roundtrip_typed_claim_sets() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let access = AccessClaims::new("user123", "a@x.com", "alice", "user", 900);
        let token = handler.encode(&access).expect("Failed to encode token");
        let decoded: AccessClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, access);

        let refresh = RefreshClaims::new("user123", 7);
        let token = handler.encode(&refresh).expect("Failed to encode token");
        let decoded: RefreshClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, refresh);
    }
}
