use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

/// Default location of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.mpk";

/// Default bind address for the prediction service.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port for the prediction service.
pub const DEFAULT_PORT: u16 = 5000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where `train` writes the model and `serve`/`predict` read it from
    pub model_path: PathBuf,

    /// Address the HTTP server binds to
    pub host: IpAddr,

    /// Port the HTTP server binds to
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// Optional environment variables:
    /// - `MODEL_PATH`: model artifact path (default: `artifacts/model.mpk`)
    /// - `HOST`: bind address (default: `127.0.0.1`)
    /// - `PORT`: bind port (default: `5000`)
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` or `PORT` is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` or `PORT` is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let model_path = lookup("MODEL_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from);

        let host = lookup("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .context("HOST environment variable is not a valid IP address")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT environment variable is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            model_path,
            host,
            port,
        })
    }

    /// Socket address the server should listen on.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).expect("defaults should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("MODEL_PATH", "/tmp/iris/model.mpk"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ]))
        .expect("overrides should parse");

        assert_eq!(config.model_path, PathBuf::from("/tmp/iris/model.mpk"));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
