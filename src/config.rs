use std::{env, net::SocketAddr};

use crate::{Error, Result};

/// Where the server listens and who may call it.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Base URL of the web client, used in mails and OAuth redirects.
    pub frontend_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            frontend_url: env::var("FRONTEND_URL")?
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| Error::EnvVarError(format!("invalid bind address {}:{}", self.host, self.port)))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173/, https://rap2rue.com ,,"),
            vec!["http://localhost:5173", "https://rap2rue.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: vec![],
            frontend_url: "http://localhost:5173".to_string(),
        };
        assert_eq!(config.socket_addr().unwrap().port(), 5000);

        let broken = ServerConfig {
            host: "not a host".to_string(),
            ..config
        };
        assert!(broken.socket_addr().is_err());
    }
}
