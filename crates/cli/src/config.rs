//! CLI configuration.
//!
//! Loaded from a TOML profile file, overridable through `EPGU_*`
//! environment variables (`EPGU_TOKEN`, `EPGU_API_URI`,
//! `EPGU_ESIA__CLIENT_ID`, ...).

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "epgu.toml";

/// CLI profile.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// EPGU API base URI.
    #[serde(default = "default_api_uri")]
    pub api_uri: String,
    /// ESIA base URI.
    #[serde(default = "default_esia_uri")]
    pub esia_uri: String,
    /// Bearer token for API calls.
    #[serde(default)]
    pub token: Option<String>,
    /// ESIA signing configuration.
    #[serde(default)]
    pub esia: Option<EsiaConfig>,
}

/// ESIA signing configuration.
#[derive(Debug, Deserialize)]
pub struct EsiaConfig {
    /// Consuming-system mnemonic (`client_id`).
    pub client_id: String,
    /// Certificate hash registered in ESIA.
    pub cert_hash: String,
    /// Path to the CryptoPro `csptest` utility.
    pub csptest_path: PathBuf,
    /// Certificate container name.
    pub container: String,
}

fn default_api_uri() -> String {
    "https://gosuslugi.ru".to_string()
}

fn default_esia_uri() -> String {
    "https://esia.gosuslugi.ru".to_string()
}

impl CliConfig {
    /// Load the profile from the given file (or `epgu.toml` in the
    /// working directory) merged with `EPGU_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        Figment::new()
            .merge(Toml::file(file))
            .merge(Env::prefixed("EPGU_").split("__"))
            .extract()
            .context("failed to load configuration")
    }

    /// The bearer token, required for every API call.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .context("no bearer token configured; set `token` in the profile or EPGU_TOKEN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            api_uri = "https://svcdev-beta.test.gosuslugi.ru"
            token = "test-token"

            [esia]
            client_id = "TESTSYS"
            cert_hash = "hash"
            csptest_path = "/opt/cprocsp/bin/csptest"
            container = "CONT"
            "#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_uri, "https://svcdev-beta.test.gosuslugi.ru");
        assert_eq!(config.esia_uri, "https://esia.gosuslugi.ru");
        assert_eq!(config.require_token().unwrap(), "test-token");
        assert_eq!(config.esia.unwrap().client_id, "TESTSYS");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::load(Some(Path::new("/nonexistent/epgu.toml"))).unwrap();
        assert_eq!(config.api_uri, "https://gosuslugi.ru");
        assert!(config.token.is_none());
        assert!(config.require_token().is_err());
    }
}
