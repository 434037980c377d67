//! Process configuration and keychain loading.
//!
//! Everything comes from environment variables (a `.env` file is honoured by
//! the binary) with defaults matching the function host's conventions. A
//! missing, malformed, or empty keychain is a startup error.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use raindrop_core::{Credential, DEFAULT_BASE_URL};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Port variable set by the function host for custom handlers.
pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const KEYCHAIN_ENV: &str = "NIMBUS_KEYCHAIN";
pub const BASE_URL_ENV: &str = "NIMBUS_BASE_URL";

pub const DEFAULT_KEYCHAIN_PATH: &str = "secret/keychain.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading keychain {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing keychain {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("keychain {} holds an empty bearer token", .0.display())]
    EmptyCredential(PathBuf),

    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub keychain_path: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let config = Self {
            base_url: get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            keychain_path: get(KEYCHAIN_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEYCHAIN_PATH)),
            port,
        };
        debug!(
            base_url = %config.base_url,
            keychain = %config.keychain_path.display(),
            port = config.port,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Listen on every interface, like the function host expects.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[derive(Deserialize)]
struct KeyChain {
    bearer: String,
}

/// Read `{"bearer": "<token>"}` from `path`.
pub fn load_credential(path: &Path) -> Result<Credential, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let keychain: KeyChain = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let credential = Credential::new(keychain.bearer.trim());
    if credential.is_empty() {
        return Err(ConfigError::EmptyCredential(path.to_path_buf()));
    }
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.keychain_path, PathBuf::from(DEFAULT_KEYCHAIN_PATH));
        assert_eq!(config.port, 8080);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            (PORT_ENV, "7071"),
            (KEYCHAIN_ENV, "/run/secrets/raindrop.json"),
            (BASE_URL_ENV, "http://127.0.0.1:3000/rest/v1"),
        ]))
        .unwrap();
        assert_eq!(config.port, 7071);
        assert_eq!(config.keychain_path, PathBuf::from("/run/secrets/raindrop.json"));
        assert_eq!(config.base_url, "http://127.0.0.1:3000/rest/v1");
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[(PORT_ENV, ""), (BASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[(PORT_ENV, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(ref p) if p == "eighty"));
    }

    #[test]
    fn loads_bearer_from_keychain() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bearer":"abc-123"}}"#).unwrap();
        let credential = load_credential(file.path()).unwrap();
        assert_eq!(credential.token(), "abc-123");
        assert_eq!(credential.authorization(), "Bearer abc-123");
    }

    #[test]
    fn missing_keychain_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credential(&dir.path().join("keychain.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_keychain_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token":"abc"}}"#).unwrap();
        let err = load_credential(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_bearer_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bearer":"  "}}"#).unwrap();
        let err = load_credential(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCredential(_)));
    }
}
