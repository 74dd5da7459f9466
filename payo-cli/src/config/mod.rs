//! Configuration for the `payo` binary.
//!
//! Handles loading configuration from a TOML file and applying CLI/env
//! overrides, and writes the file back when settings are edited.

pub mod file;

use crate::config::file::FileConfig;
use payo_core::backend::{ApiBackend, MockConfig};
use payo_sdk::config::ApiConfig;
use payo_sdk::objects::{SettingsError, UserSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("config file {0} already exists")]
    AlreadyExists(PathBuf),
}

/// Values taken from flags or the environment, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<ApiBackend>,
    pub base_url: Option<Url>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backend: ApiBackend,
    pub api: ApiConfig,
    pub mock: MockConfig,
    pub stale_time: Duration,
    pub payment_page_interval: Duration,
    pub invoice_detail_interval: Duration,
    pub finance_path: PathBuf,
    pub settings: UserSettings,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, or start from defaults if there is none
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(backend) = self.overrides.backend {
            file_config.api.backend = backend;
        }
        if let Some(base_url) = &self.overrides.base_url {
            file_config.api.base_url = base_url.clone();
        }

        self.validate(&file_config)?;
        Ok(build_runtime_config(file_config))
    }

    /// Replace the `[settings]` section and rewrite the file.
    ///
    /// Overrides are not written back.
    pub fn save_settings(&self, settings: &UserSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        let mut file_config = self.read_file()?;
        file_config.settings = settings.clone();
        self.rewrite_config(&file_config)?;
        tracing::info!(path = %self.config_path.display(), "Settings saved");
        Ok(())
    }

    /// Write a config file holding every default.
    pub fn write_default(&self, force: bool) -> Result<(), ConfigError> {
        if self.config_path.exists() && !force {
            return Err(ConfigError::AlreadyExists(self.config_path.clone()));
        }
        self.rewrite_config(&FileConfig::default())
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                Ok(FileConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if !matches!(config.api.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "base_url must be http or https, got {}",
                config.api.base_url
            )));
        }
        if config.polling.payment_page_ms == 0 || config.polling.invoice_detail_ms == 0 {
            return Err(ConfigError::ValidationError(
                "polling intervals must be greater than zero".to_owned(),
            ));
        }
        if config.api.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero when set".to_owned(),
            ));
        }
        config.settings.validate()?;
        Ok(())
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn build_runtime_config(file_config: FileConfig) -> RuntimeConfig {
    let FileConfig {
        api,
        polling,
        mock,
        finance,
        settings,
    } = file_config;

    RuntimeConfig {
        backend: api.backend,
        api: ApiConfig {
            base_url: api.base_url,
            timeout: api.timeout_secs.map(Duration::from_secs),
        },
        mock: MockConfig {
            latency: Duration::from_millis(mock.latency_ms),
            default_expiry_min: settings.default_expiry_min,
            seed_samples: mock.seed_samples,
        },
        stale_time: Duration::from_secs(api.stale_time_secs),
        payment_page_interval: Duration::from_millis(polling.payment_page_ms),
        invoice_detail_interval: Duration::from_millis(polling.invoice_detail_ms),
        finance_path: finance.store_path,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(dir.path().join("payo.toml"), Overrides::default());
        let config = loader.load().unwrap();
        assert_eq!(config.backend, ApiBackend::Mock);
        assert_eq!(config.api.timeout, None);
        assert_eq!(config.payment_page_interval, Duration::from_secs(3));
        assert_eq!(config.invoice_detail_interval, Duration::from_secs(5));
        assert_eq!(config.mock.latency, Duration::from_secs(1));
        assert_eq!(config.stale_time, Duration::ZERO);
    }

    #[test]
    fn overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payo.toml");
        std::fs::write(
            &path,
            "[api]\nbackend = \"mock\"\nbase_url = \"http://localhost:9000\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(
            &path,
            Overrides {
                backend: Some(ApiBackend::Live),
                base_url: Some(Url::parse("https://api.payo.app").unwrap()),
            },
        );
        let config = loader.load().unwrap();
        assert_eq!(config.backend, ApiBackend::Live);
        assert_eq!(config.api.base_url.as_str(), "https://api.payo.app/");
        assert_eq!(config.api.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payo.toml");

        std::fs::write(&path, "[polling]\npayment_page_ms = 0\n").unwrap();
        let loader = ConfigLoader::new(&path, Overrides::default());
        assert!(matches!(loader.load(), Err(ConfigError::ValidationError(_))));

        std::fs::write(&path, "[settings]\ndefault_expiry_min = 7\n").unwrap();
        assert!(matches!(
            loader.load(),
            Err(ConfigError::Settings(SettingsError::UnsupportedExpiry(7)))
        ));

        std::fs::write(&path, "[api]\nbase_url = \"ftp://files.example\"\n").unwrap();
        assert!(matches!(loader.load(), Err(ConfigError::ValidationError(_))));

        std::fs::write(&path, "[api\n").unwrap();
        assert!(matches!(loader.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn save_settings_keeps_other_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payo.toml");
        std::fs::write(&path, "[mock]\nlatency_ms = 0\n").unwrap();
        let loader = ConfigLoader::new(&path, Overrides::default());

        let settings = UserSettings {
            evm_address: Some("0x742d35Cc6635C0532925a3b8D2F3ED3e9".into()),
            default_expiry_min: 30,
            ..Default::default()
        };
        loader.save_settings(&settings).unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.settings, settings);
        assert_eq!(config.mock.latency, Duration::ZERO);
        assert_eq!(config.mock.default_expiry_min, 30);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn invalid_settings_are_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payo.toml");
        let loader = ConfigLoader::new(&path, Overrides::default());

        let settings = UserSettings {
            tolerance_pct: 3,
            ..Default::default()
        };
        assert!(loader.save_settings(&settings).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payo.toml");
        let loader = ConfigLoader::new(&path, Overrides::default());

        loader.write_default(false).unwrap();
        assert!(path.exists());
        assert!(matches!(
            loader.write_default(false),
            Err(ConfigError::AlreadyExists(_))
        ));
        loader.write_default(true).unwrap();
        loader.load().unwrap();
    }
}
