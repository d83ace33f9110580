// 🔧 Server Configuration
//
// Read from environment variables, then a `.env` file in the working
// directory, falling back to defaults. The process environment wins.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DOTENV_FILE: &str = ".env";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Bundesbank export name, resolved against the working directory
pub const DEFAULT_DATA_PATH: &str = "blz-aktuell-csv-data.csv";

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_DATA_PATH: &str = "BLZ_DATA_PATH";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Reference dataset (bank codes → BIC)
    pub data_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment and `./.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_dotenv(DOTENV_FILE, |key| env::var(key).ok())
    }

    /// Load configuration from `env_lookup`, filling gaps from a dotenv file
    ///
    /// A missing file is not an error. Malformed lines are skipped with a
    /// warning.
    pub fn with_dotenv<P, F>(path: P, env_lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_dotenv(path.as_ref());
        Self::from_lookup(|key| env_lookup(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let port = match lookup(ENV_PORT) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_PORT.to_string()))?,
            None => defaults.port,
        };

        Ok(ServerConfig {
            host: lookup(ENV_HOST).unwrap_or(defaults.host),
            port,
            data_path: lookup(ENV_DATA_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
        })
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue(ENV_HOST.to_string()))
    }
}

fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(_) => return HashMap::new(),
    };

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping malformed .env entry: {}", e);
            None
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("blz-aktuell-csv-data.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("BLZ_DATA_PATH", "/srv/blz.csv"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.data_path, PathBuf::from("/srv/blz.csv"));
    }

    #[test]
    fn test_invalid_port() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert_eq!(result, Err(ConfigError::InvalidValue("PORT".to_string())));
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::from_lookup(lookup_from(&[("HOST", "not a host")])).unwrap();
        assert!(config.bind_addr().is_err());
    }

    fn dotenv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_dotenv_file_supplies_values() {
        let file = dotenv_file("PORT=9191\nBLZ_DATA_PATH=/srv/blz.csv\n");

        let config = ServerConfig::with_dotenv(file.path(), |_| None).unwrap();

        assert_eq!(config.port, 9191);
        assert_eq!(config.data_path, PathBuf::from("/srv/blz.csv"));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_process_env_overrides_dotenv() {
        let file = dotenv_file("PORT=9191\n");

        let config =
            ServerConfig::with_dotenv(file.path(), lookup_from(&[("PORT", "7000")])).unwrap();

        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_missing_dotenv_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = ServerConfig::with_dotenv(dir.path().join(".env"), |_| None).unwrap();

        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_invalid_port_in_dotenv() {
        let file = dotenv_file("PORT=eighty\n");

        let result = ServerConfig::with_dotenv(file.path(), |_| None);

        assert_eq!(result, Err(ConfigError::InvalidValue("PORT".to_string())));
    }
}
