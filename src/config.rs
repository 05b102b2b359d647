use serde::{Deserialize, Serialize};

const API_VERSION: &str = "v1";

/// Where the client points.
///
/// Defaults to the production Hootsuite platform; override `base_url` to
/// talk to a stub server in tests or a staging deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://platform.hootsuite.com".to_string(),
        }
    }
}

impl ApiConfig {
    /// The OAuth2 authorization endpoint members are sent to.
    pub fn authorization_url(&self) -> String {
        format!("{}/oauth2/auth", self.base_url)
    }

    /// The OAuth2 token endpoint for code and refresh grants.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base_url)
    }

    /// The versioned API root all resource paths hang off.
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, API_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let config = ApiConfig::default();
        assert_eq!(config.api_url(), "https://platform.hootsuite.com/v1");
        assert_eq!(
            config.authorization_url(),
            "https://platform.hootsuite.com/oauth2/auth"
        );
        assert_eq!(
            config.token_url(),
            "https://platform.hootsuite.com/oauth2/token"
        );
    }

    #[test]
    fn custom_base_url_carries_through() {
        let config = ApiConfig {
            base_url: "http://localhost:9999".to_string(),
        };
        assert_eq!(config.api_url(), "http://localhost:9999/v1");
        assert_eq!(config.token_url(), "http://localhost:9999/oauth2/token");
    }
}
