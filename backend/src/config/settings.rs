use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECRET_KEY: &str = "change-me";
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Signs the flash-message cookie.
    pub secret_key: String,
    pub upload_dir: PathBuf,
    pub max_content_length: usize,
    pub model_path: PathBuf,
    pub search_base_url: String,
    pub workers: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            upload_dir: PathBuf::from("static/uploads"),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            model_path: PathBuf::from("poultry_model.onnx"),
            search_base_url: "https://scholar.google.com/scholar?q=Veterinary+".to_string(),
            workers: None,
        }
    }
}

impl Settings {
    /// Reads `POULTRY_CONFIG` (or `config/settings.yaml` when it exists),
    /// then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = match env::var("POULTRY_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        let settings = settings.with_env_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(config_str)?;
        Ok(settings)
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value: port })?;
        }
        if let Some(secret_key) = lookup("SECRET_KEY") {
            self.secret_key = secret_key;
        }
        if let Some(upload_dir) = lookup("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(upload_dir);
        }
        if let Some(model_path) = lookup("MODEL_PATH") {
            self.model_path = PathBuf::from(model_path);
        }
        if let Some(max) = lookup("MAX_CONTENT_LENGTH") {
            self.max_content_length = max.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MAX_CONTENT_LENGTH",
                value: max,
            })?;
        }
        if let Some(workers) = lookup("WORKERS") {
            let parsed = workers.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "WORKERS",
                value: workers,
            })?;
            self.workers = Some(parsed);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::Invalid("secret_key must not be empty".into()));
        }
        if self.max_content_length == 0 {
            return Err(ConfigError::Invalid(
                "max_content_length must be positive".into(),
            ));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("model_path must not be empty".into()));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be positive".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.max_content_length, 16 * 1024 * 1024);
        assert_eq!(settings.upload_dir, PathBuf::from("static/uploads"));
        assert!(settings.uses_default_secret());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let settings = Settings::from_yaml("port: 8081\nmodel_path: models/poultry.pt\n").unwrap();
        assert_eq!(settings.port, 8081);
        assert_eq!(settings.model_path, PathBuf::from("models/poultry.pt"));
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.bind_address(), "127.0.0.1:8081");
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("PORT", "9000"), ("SECRET_KEY", "s3cret"), ("WORKERS", "2")]);
        let settings = Settings::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.secret_key, "s3cret");
        assert_eq!(settings.workers, Some(2));
    }

    #[test]
    fn malformed_port_is_rejected() {
        let result = Settings::default().with_env_overrides(|key| {
            (key == "PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnv { key: "PORT", .. })));
    }

    #[test]
    fn empty_secret_fails_validation() {
        let settings = Settings {
            secret_key: String::new(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }
}
