use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// OAuth2 access/refresh credential pair with expiry metadata.
///
/// Replaced wholesale by the token store on every successful exchange or
/// refresh, never mutated in place. Either empty (unauthenticated) or
/// carrying a non-empty `access_token`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime reported by the provider at issue time, in seconds.
    #[serde(default)]
    pub expires_in: i64,
    /// Absolute expiry derived from `expires_in` when the token came from
    /// the token endpoint. May be absent on tokens injected by the caller.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// True when no token has been obtained yet.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }

    /// Whether the dispatcher should refresh before using this token.
    ///
    /// Tokens with an absolute expiry are stale once it passes. Tokens
    /// injected without one fall back to the static `expires_in` field,
    /// which is never decremented, so such a token is either always fresh
    /// or refreshed on first use.
    pub fn is_stale(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => self.expires_in <= 0,
        }
    }
}

/// Invoked with the replacement token after every successful code exchange
/// or refresh, so callers can persist it.
pub type RefreshCallback = Arc<dyn Fn(&Token) + Send + Sync>;

/// The default callback: keep the token in memory only.
pub fn noop_refresh_callback() -> RefreshCallback {
    Arc::new(|_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_in(hours: i64) -> Token {
        Token {
            access_token: "access_token_123".to_string(),
            refresh_token: "refresh_token_456".to_string(),
            expires_in: hours * 3600,
            expires_at: Some(Utc::now() + Duration::hours(hours)),
        }
    }

    #[test]
    fn token_with_future_expiry_is_fresh() {
        assert!(!token_expiring_in(1).is_stale());
    }

    #[test]
    fn token_with_past_expiry_is_stale() {
        assert!(token_expiring_in(-1).is_stale());
    }

    #[test]
    fn token_without_absolute_expiry_uses_static_lifetime() {
        let mut token = token_expiring_in(1);
        token.expires_at = None;
        token.expires_in = 3600;
        assert!(!token.is_stale());

        token.expires_in = 0;
        assert!(token.is_stale());
    }

    #[test]
    fn default_token_is_empty_and_stale() {
        let token = Token::default();
        assert!(token.is_empty());
        assert!(token.is_stale());
    }

    #[test]
    fn token_serialization_roundtrip() {
        let token = token_expiring_in(1);
        let json = serde_json::to_string(&token).unwrap();
        let deserialized: Token = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.access_token, token.access_token);
        assert_eq!(deserialized.refresh_token, token.refresh_token);
        assert_eq!(deserialized.expires_at, token.expires_at);
    }

    #[test]
    fn partial_token_deserializes_with_defaults() {
        let token: Token = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_empty());
        assert!(token.expires_at.is_none());
        assert!(token.is_stale());
    }
}
