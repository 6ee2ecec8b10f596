//! Configuration loading and management
//!
//! Loaded once at startup: YAML file first, then environment overrides,
//! then validation. A missing file is not an error; every section has a
//! usable default except the token secret, which must come from somewhere.

use crate::core::error::ConfigError;
use crate::core::upload::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the YAML file to load
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// File loaded when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "storefront.yaml";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Base URL used in `request` hints (e.g. `http://localhost:3000`)
    pub public_url: String,

    /// Send permissive CORS headers
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
            cors: true,
        }
    }
}

/// Bearer token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret
    pub jwt_secret: String,

    /// Lifetime of issued tokens
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 3600,
        }
    }
}

/// Image upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_size: usize,
    pub allowed_mime_types: Vec<String>,
    pub field_name: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            field_name: "productImage".to_string(),
        }
    }
}

/// Which document store backs the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local store, lost on restart
    #[default]
    Memory,

    /// MongoDB (requires the `mongodb_backend` feature)
    Mongodb { uri: String, database: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration the way the binary does
    ///
    /// Reads the file named by `STOREFRONT_CONFIG` (default
    /// `storefront.yaml`), applies environment overrides and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let mut config = if Path::new(&path).exists() {
            Self::from_yaml_file(&path)?
        } else {
            tracing::info!(path = %path, "no config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overlay the supported environment variables
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("JWT_KEY") {
            self.auth.jwt_secret = secret;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("PUBLIC_URL") {
            self.server.public_url = url;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(dir);
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.storage = match std::mem::take(&mut self.storage) {
                StorageConfig::Mongodb { database, .. } => StorageConfig::Mongodb { uri, database },
                StorageConfig::Memory => StorageConfig::Mongodb {
                    uri,
                    database: "storefront".to_string(),
                },
            };
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".to_string(),
                value: String::new(),
                message: "a token secret is required (set JWT_KEY)".to_string(),
            });
        }

        if self.uploads.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "uploads.max_file_size".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.uploads.allowed_mime_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "uploads.allowed_mime_types".to_string(),
                value: "[]".to_string(),
                message: "at least one type must be allowed".to_string(),
            });
        }

        if !self.server.public_url.starts_with("http://")
            && !self.server.public_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "server.public_url".to_string(),
                value: self.server.public_url.clone(),
                message: "must be an absolute http(s) URL".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
