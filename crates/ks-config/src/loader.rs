//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "keystone.toml",
    "./config/config.toml",
    "./config/keystone.toml",
    "/etc/keystone/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file not found, searching standard paths");
        }

        if let Ok(path) = env::var("KEYSTONE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `KEYSTONE_*` overrides read through `lookup`.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("KEYSTONE_HTTP_PORT") {
        config.http.port = val.parse().map_err(|_| {
            ConfigError::ValidationError(format!("KEYSTONE_HTTP_PORT is not a port: {}", val))
        })?;
    }
    if let Some(val) = lookup("KEYSTONE_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("KEYSTONE_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // MongoDB
    if let Some(val) = lookup("KEYSTONE_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("KEYSTONE_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Storage
    if let Some(val) = lookup("KEYSTONE_STORAGE_BACKEND") {
        config.storage.backend = val.parse()?;
    }
    if let Some(val) = lookup("KEYSTONE_STORAGE_INITIALIZE_INDEXES") {
        config.storage.initialize_indexes = val.parse().unwrap_or(true);
    }

    // Auth
    if let Some(val) = lookup("KEYSTONE_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("KEYSTONE_JWT_ISSUER") {
        config.auth.issuer = val;
    }
    if let Some(val) = lookup("KEYSTONE_JWT_AUDIENCE") {
        config.auth.audience = val;
    }

    // Features
    if let Some(val) = lookup("KEYSTONE_FEATURE_QUERY_MODULES") {
        config.features.query_modules = val.parse().unwrap_or(true);
    }

    // License
    if let Some(val) = lookup("KEYSTONE_LICENSE_VERIFICATION_KEY") {
        config.license.verification_key = val;
    }
    if let Some(val) = lookup("KEYSTONE_LICENSE_KEY") {
        config.license.key = val;
    }

    // General
    if let Some(val) = lookup("KEYSTONE_DEV_MODE") {
        config.dev_mode = val == "true" || val == "1";
    }

    Ok(())
}
