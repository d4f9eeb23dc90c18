use std::env;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::{error::Error, Result};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// What a social login tells us about the person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub provider_id: String,
    pub email: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start the login.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Exchanges the callback code for the person's profile.
    async fn fetch_profile(&self, code: &str) -> Result<SocialProfile>;
}

#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleOAuthConfig {
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("BACKEND_URL")?;
        Ok(Self {
            client_id: env::var("GOOGLE_CLIENT_ID")?,
            client_secret: env::var("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: format!(
                "{}/api/auth/google/callback",
                backend_url.trim_end_matches('/')
            ),
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

pub struct GoogleOAuthClient {
    config: GoogleOAuthConfig,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

fn identity_error(message: impl Into<String>) -> Error {
    Error::IdentityProvider {
        message: message.into(),
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )
        .map_err(|e| identity_error(e.to_string()))?;

        Ok(url.into())
    }

    async fn fetch_profile(&self, code: &str) -> Result<SocialProfile> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| identity_error(format!("Échec de l'échange du code Google: {e}")))?
            .json()
            .await
            .map_err(|e| identity_error(format!("Réponse Google illisible: {e}")))?;

        let info: GoogleUserInfo = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| identity_error(format!("Profil Google indisponible: {e}")))?
            .json()
            .await
            .map_err(|e| identity_error(format!("Réponse Google illisible: {e}")))?;

        Ok(SocialProfile {
            provider_id: info.sub,
            name: info
                .name
                .unwrap_or_else(|| info.email.clone().unwrap_or_default()),
            email: info.email,
            avatar: info.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_state_and_redirect() {
        let client = GoogleOAuthClient::new(GoogleOAuthConfig {
            client_id: "client-1".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:5000/api/auth/google/callback".into(),
        });

        let url = Url::parse(&client.authorize_url("state-123").unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(params.contains(&("state".into(), "state-123".into())));
        assert!(params.contains(&("client_id".into(), "client-1".into())));
        assert!(params.contains(&(
            "redirect_uri".into(),
            "http://localhost:5000/api/auth/google/callback".into()
        )));
    }
}
