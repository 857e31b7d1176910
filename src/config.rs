//! Process-wide configuration, read once from the environment at startup.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The default address the server listens on.
const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// The branch used when `GITHUB_BRANCH` isn't set.
const DEFAULT_BRANCH: &str = "main";

/// The default base URL of the GitHub REST API.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// The default base URL GitHub serves raw branch content from.
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// How the catalog document is read from GitHub.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum FetchStrategy {
    /// Reads base64-encoded content through the contents API. Never served from an edge cache.
    #[default]
    Contents,

    /// Reads the raw file from the branch's content delivery path. Needs no credential, but the
    /// response may be cached at the edge for a few minutes.
    Raw,
}

impl FromStr for FetchStrategy {
    type Err = ConfigError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        match str.to_ascii_lowercase().as_str() {
            "contents" => Ok(Self::Contents),
            "raw" => Ok(Self::Raw),
            _ => Err(ConfigError::InvalidFetchStrategy(str.to_owned())),
        }
    }
}

/// An error reading the [`Config`] from the environment.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum ConfigError {
    /// `ICONS_FETCH_STRATEGY` wasn't one of the known strategies.
    #[error("invalid fetch strategy {0:?}, expected \"contents\" or \"raw\"")]
    InvalidFetchStrategy(String),
}

/// Immutable configuration shared by both endpoints.
///
/// The repository coordinates are optional here so a misconfigured deployment still starts;
/// outbound calls then fail and surface through each endpoint's generic failure response.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// The address the server listens on.
    pub address: String,

    /// The owner (user or organization) of the repository holding the catalog.
    pub owner: Option<String>,

    /// The name of the repository holding the catalog.
    pub repo: Option<String>,

    /// The branch the catalog is read from and committed to.
    pub branch: String,

    /// The GitHub access token. Required for writes.
    pub token: Option<String>,

    /// The shared secret callers must send to update the catalog. If unset, no update is
    /// authorized.
    pub admin_password: Option<String>,

    /// How the catalog document is read.
    pub fetch_strategy: FetchStrategy,

    /// The base URL of the GitHub REST API, without a trailing slash.
    pub api_url: String,

    /// The base URL of raw branch content, without a trailing slash.
    pub raw_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            owner: None,
            repo: None,
            branch: DEFAULT_BRANCH.into(),
            token: None,
            admin_password: None,
            fetch_strategy: FetchStrategy::default(),
            api_url: DEFAULT_API_URL.into(),
            raw_url: DEFAULT_RAW_URL.into(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// Hides a secret's value while still showing whether it's set.
        fn redact(secret: Option<&String>) -> Option<&'static str> {
            secret.map(|_| "<redacted>")
        }

        f.debug_struct("Config")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &redact(self.token.as_ref()))
            .field("admin_password", &redact(self.admin_password.as_ref()))
            .field("fetch_strategy", &self.fetch_strategy)
            .field("api_url", &self.api_url)
            .field("raw_url", &self.raw_url)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from environment variables, including any set in a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let fetch_strategy = match var("ICONS_FETCH_STRATEGY") {
            Some(strategy) => strategy.parse()?,
            None => defaults.fetch_strategy,
        };

        Ok(Self {
            address: var("ADDRESS").unwrap_or(defaults.address),
            owner: var("GITHUB_OWNER"),
            repo: var("GITHUB_REPO"),
            branch: var("GITHUB_BRANCH").unwrap_or(defaults.branch),
            token: var("GITHUB_TOKEN"),
            admin_password: var("ADMIN_PASSWORD"),
            fetch_strategy,
            api_url: var("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.api_url),
            raw_url: var("GITHUB_RAW_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.raw_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).expect("empty environment should be valid");

        assert_eq!(config, Config::default());
        assert_eq!(config.branch, "main");
        assert_eq!(config.fetch_strategy, FetchStrategy::Contents);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config_from(&[("GITHUB_BRANCH", ""), ("ADMIN_PASSWORD", "")])
            .expect("empty values should be valid");

        assert_eq!(config.branch, "main");
        assert_eq!(config.admin_password, None);
    }

    #[test]
    fn reads_repository_coordinates() {
        let config = config_from(&[
            ("GITHUB_OWNER", "octo"),
            ("GITHUB_REPO", "icons"),
            ("GITHUB_BRANCH", "gh-pages"),
            ("GITHUB_TOKEN", "ghp_secret"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("ICONS_FETCH_STRATEGY", "Raw"),
            ("GITHUB_API_URL", "http://localhost:9000/"),
        ])
        .expect("environment should be valid");

        assert_eq!(config.owner.as_deref(), Some("octo"));
        assert_eq!(config.repo.as_deref(), Some("icons"));
        assert_eq!(config.branch, "gh-pages");
        assert_eq!(config.token.as_deref(), Some("ghp_secret"));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.fetch_strategy, FetchStrategy::Raw);
        assert_eq!(config.api_url, "http://localhost:9000");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config {
            token: Some("ghp_secret".into()),
            admin_password: Some("hunter2".into()),
            ..Config::default()
        };

        let debug = format!("{config:?}");

        assert!(!debug.contains("ghp_secret"), "token should be redacted");
        assert!(!debug.contains("hunter2"), "admin password should be redacted");
    }

    #[test]
    fn rejects_unknown_fetch_strategy() {
        assert_eq!(
            config_from(&[("ICONS_FETCH_STRATEGY", "cdn")]),
            Err(ConfigError::InvalidFetchStrategy("cdn".into())),
        );
    }
}
