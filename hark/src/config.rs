//! Client configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! token = "xoxb-..."            # or set HARK_TOKEN
//! api_base = "https://slack.com/api"
//! default_channel = "#general"
//!
//! [ids]
//! channel_prefixes = ["C", "G"]
//! user_prefixes = ["U", "W"]
//! ```

use hark_core::IdConvention;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable consulted when the file has no token.
pub const TOKEN_ENV: &str = "HARK_TOKEN";

/// Platform API root used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Neither the file nor the environment provides a token.
    #[error("no token configured; set `token` or HARK_TOKEN")]
    MissingToken,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    token: Option<String>,
    #[serde(default = "default_api_base")]
    api_base: String,
    default_channel: Option<String>,
    #[serde(default)]
    ids: IdConvention,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Client configuration.
#[derive(Debug)]
pub struct Config {
    /// API token used for the handshake.
    pub token: SecretString,
    /// Root of the platform's HTTP API, without a trailing slash.
    pub api_base: String,
    /// Channel used by `say` when no channel is given.
    pub default_channel: Option<String>,
    /// What counts as a channel or user id.
    pub ids: IdConvention,
}

impl Config {
    /// A config with the given token and defaults for everything else.
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            token: SecretString::from(token),
            api_base: default_api_base(),
            default_channel: None,
            ids: IdConvention::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::from_raw(raw, std::env::var(TOKEN_ENV).ok())
    }

    fn from_raw(raw: RawConfig, env_token: Option<String>) -> Result<Self, ConfigError> {
        let token = raw
            .token
            .or(env_token)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token: SecretString::from(token),
            api_base: raw.api_base.trim_end_matches('/').to_string(),
            default_channel: raw.default_channel,
            ids: raw.ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn parse(content: &str, env_token: Option<&str>) -> Result<Config, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Config::from_raw(raw, env_token.map(str::to_string))
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r##"
            token = "xoxb-file"
            api_base = "http://localhost:9000/api/"
            default_channel = "#general"

            [ids]
            channel_prefixes = ["K"]
            "##,
            None,
        )
        .unwrap();

        assert_eq!(config.token.expose_secret(), "xoxb-file");
        assert_eq!(config.api_base, "http://localhost:9000/api");
        assert_eq!(config.default_channel.as_deref(), Some("#general"));
        assert_eq!(config.ids.channel_prefixes, ["K"]);
        assert_eq!(config.ids.user_prefixes, ["U", "W"]);
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"token = "t""#, None).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.default_channel, None);
        assert_eq!(config.ids, IdConvention::default());
    }

    #[test]
    fn test_token_falls_back_to_env() {
        let config = parse("", Some("xoxb-env")).unwrap();
        assert_eq!(config.token.expose_secret(), "xoxb-env");

        let config = parse(r#"token = "xoxb-file""#, Some("xoxb-env")).unwrap();
        assert_eq!(config.token.expose_secret(), "xoxb-file");
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(parse("", None), Err(ConfigError::MissingToken)));
        assert!(matches!(
            parse(r#"token = "  ""#, None),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse("token = [", None),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse(r#"tokn = "typo""#, Some("t")),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = Config::new("xoxb-secret");
        assert!(!format!("{config:?}").contains("xoxb-secret"));
    }
}
