//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `content.project_id`
//! - `content.dataset`
//! - `content.token`
//! - `content.api_host`

mod expand;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override render mode.
    pub mode: Option<RenderMode>,
    /// Override live preview enabled flag.
    pub live_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content backend configuration.
    pub content: ContentConfig,
    /// Page rendering configuration.
    pub render: RenderConfig,
    /// Live preview configuration.
    pub live: LiveConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Content backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Project identifier, used to build the API host name.
    pub project_id: String,
    /// Dataset to query.
    pub dataset: String,
    /// API version date (e.g. "2021-10-21").
    pub api_version: String,
    /// Query the CDN host for published content.
    pub use_cdn: bool,
    /// API token. Required to read drafts in preview mode.
    pub token: Option<String>,
    /// Explicit API base URL, replacing the host derived from `project_id`.
    pub api_host: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_owned(),
            api_version: "2021-10-21".to_owned(),
            use_cdn: true,
            token: None,
            api_host: None,
        }
    }
}

impl ContentConfig {
    /// Base URL for queries.
    ///
    /// Preview queries never go through the CDN since it only serves
    /// published documents.
    #[must_use]
    pub fn base_url(&self, preview: bool) -> String {
        if let Some(host) = &self.api_host {
            return host.trim_end_matches('/').to_owned();
        }
        if self.use_cdn && !preview {
            format!("https://{}.apicdn.sanity.io", self.project_id)
        } else {
            format!("https://{}.api.sanity.io", self.project_id)
        }
    }

    /// Validate that the backend can be reached with these settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.api_host {
            Some(host) => require_http_url(host, "content.api_host")?,
            None => require_project_id(&self.project_id)?,
        }
        require_non_empty(&self.dataset, "content.dataset")?;
        require_api_version(&self.api_version)?;
        if let Some(token) = &self.token {
            require_non_empty(token, "content.token")?;
        }
        Ok(())
    }
}

/// How pages are acquired from the content backend.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Snapshot every sidebar document at startup, refresh after the revalidate window.
    Static,
    /// Fetch fresh data for every request.
    Server,
    /// Snapshot documents on first request, refresh after the revalidate window.
    #[default]
    Hybrid,
}

impl std::str::FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "server" => Ok(Self::Server),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::Validation(format!(
                "render.mode must be one of static, server, hybrid (got {other:?})"
            ))),
        }
    }
}

/// Page rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Acquisition mode.
    pub mode: RenderMode,
    /// Seconds a precomputed snapshot is served before it is refetched.
    pub revalidate_secs: u64,
    /// Pages fetched in parallel while prebuilding.
    pub prebuild_concurrency: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            revalidate_secs: 10,
            prebuild_concurrency: 8,
        }
    }
}

/// Live preview configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Whether the live preview WebSocket is served.
    pub enabled: bool,
    /// Interval between preview refreshes in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 1000,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.token`").
        field: String,
        /// Error message (e.g., "${`SANITY_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Project ids end up in a host name, so only lowercase alphanumerics and dashes.
fn require_project_id(project_id: &str) -> Result<(), ConfigError> {
    require_non_empty(project_id, "content.project_id")?;
    if !project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(
            "content.project_id may only contain a-z, 0-9 and dashes".to_owned(),
        ));
    }
    Ok(())
}

/// API versions are either `1` or a `YYYY-MM-DD` date.
fn require_api_version(version: &str) -> Result<(), ConfigError> {
    if version == "1" {
        return Ok(());
    }
    let parts: Vec<&str> = version.split('-').collect();
    let is_date = parts.len() == 3
        && [4, 2, 2]
            .iter()
            .zip(&parts)
            .all(|(len, part)| part.len() == *len && part.chars().all(|c| c.is_ascii_digit()));
    if !is_date {
        return Err(ConfigError::Validation(format!(
            "content.api_version must be \"1\" or a YYYY-MM-DD date (got {version:?})"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(mode) = settings.mode {
            self.render.mode = mode;
        }
        if let Some(live_enabled) = settings.live_enabled {
            self.live.enabled = live_enabled;
        }
    }

    /// Get validated content backend configuration.
    ///
    /// Commands that talk to the backend call this instead of reading the
    /// `content` field directly, so a missing project id is reported before
    /// the first request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is invalid.
    pub fn require_content(&self) -> Result<&ContentConfig, ConfigError> {
        self.content.validate()?;
        Ok(&self.content)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(current)
    }

    fn discover_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[content]` section is validated lazily by [`Config::require_content`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_render()?;
        self.validate_live()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick, which is never what a config file means
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        if self.render.prebuild_concurrency == 0 {
            return Err(ConfigError::Validation(
                "render.prebuild_concurrency must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_live(&self) -> Result<(), ConfigError> {
        if self.live.enabled && self.live.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "live.poll_interval_ms must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.expand_vars_with(&|var| std::env::var(var).ok())
    }

    fn expand_vars_with(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let resolve = |value: &str, field: &str| expand::expand_with(value, field, lookup);

        self.server.host = resolve(&self.server.host, "server.host")?;

        let content = &mut self.content;
        content.project_id = resolve(&content.project_id, "content.project_id")?;
        content.dataset = resolve(&content.dataset, "content.dataset")?;
        if let Some(token) = &content.token {
            content.token = Some(resolve(token, "content.token")?);
        }
        if let Some(host) = &content.api_host {
            content.api_host = Some(resolve(host, "content.api_host")?);
        }

        Ok(())
    }
}
