use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a short-lived access token.
///
/// Self-contained: everything a resource server needs to identify the
/// caller travels inside the signed payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// User identifier
    pub user_id: String,

    /// Email the user logged in with
    pub email: String,

    /// Display name
    pub name: String,

    /// Fixed role marker (single-role system)
    pub role: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Expiration time as an RFC 3339 string, for human consumers
    pub expires_iso: String,
}

impl AccessClaims {
    /// Build access claims expiring `ttl_secs` from now.
    pub fn new(
        user_id: impl ToString,
        email: impl ToString,
        name: impl ToString,
        role: impl ToString,
        ttl_secs: i64,
    ) -> Self {
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);

        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            exp: expires_at.timestamp(),
            expires_iso: Self::iso(expires_at),
        }
    }

    fn iso(expires_at: DateTime<Utc>) -> String {
        expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Claims carried by a long-lived refresh token.
///
/// Minimal payload: identity and expiry plus a type marker so an access
/// token can never be mistaken for a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// User identifier
    pub user_id: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Always "refresh"
    #[serde(rename = "type")]
    pub token_type: String,
}

impl RefreshClaims {
    /// Build refresh claims expiring `ttl_days` from now.
    pub fn new(user_id: impl ToString, ttl_days: i64) -> Self {
        let expires_at = Utc::now() + Duration::days(ttl_days);

        Self {
            user_id: user_id.to_string(),
            exp: expires_at.timestamp(),
            token_type: "refresh".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_expiry() {
        let claims = AccessClaims::new("user123", "a@x.com", "alice", "user", 900);

        let delta = claims.exp - Utc::now().timestamp();
        assert!((898..=900).contains(&delta));
        assert!(claims.expires_iso.ends_with('Z'));
    }

    #[test]
    fn test_access_claims_fields() {
        let claims = AccessClaims::new("user123", "a@x.com", "alice", "user", 900);

        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_refresh_claims_type_marker() {
        let claims = RefreshClaims::new("user123", 7);

        assert_eq!(claims.token_type, "refresh");
        let delta = claims.exp - Utc::now().timestamp();
        assert!((7 * 24 * 3600 - 2..=7 * 24 * 3600).contains(&delta));
    }

    #[test]
    fn test_refresh_type_serializes_as_type() {
        let claims = RefreshClaims::new("user123", 7);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["type"], "refresh");
        assert!(json.get("token_type").is_none());
    }
}
