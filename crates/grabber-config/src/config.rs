use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use grabber_registry::{DEFAULT_DOWNLOAD_URL, DEFAULT_LOOKUP_URL};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    collection::CollectionSpec,
    error::{ConfigError, Result},
    path::{resolve_path, xdg_config_home},
};

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("GALAXY_GRABBER_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => {
            xdg_config_home()
                .join("galaxy-grabber")
                .join("config.toml")
        }
    })
});

/// Returns the currently selected config file path.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Overrides the config file path for the rest of the process.
pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Root directory collections are mirrored into.
    pub destination: String,

    /// Keep artifacts that already exist instead of downloading them again.
    pub skip_existing: bool,

    pub registry: RegistryConfig,

    pub http: HttpConfig,

    /// Collections resolved when none are given on the command line.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionSpec>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection detail endpoint, queried with `namespace` and `name`.
    pub lookup_url: String,

    /// Prefix prepended to the registry's relative download paths.
    pub download_url: String,

    /// Log status, size and timing of registry responses.
    pub trace: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: Option<String>,

    /// Global per-request timeout in seconds.
    pub timeout: Option<u64>,

    pub proxy: Option<String>,

    /// Extra request headers, written as `Name: value`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            trace: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: "./collections".to_string(),
            skip_existing: false,
            registry: RegistryConfig::default(),
            http: HttpConfig::default(),
            collections: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from [`CONFIG_PATH`].
    /// If the configuration file is not found, the default configuration is used.
    pub fn new() -> Result<Self> {
        Self::load(&config_path())
    }

    /// Loads the configuration from `path`, falling back to defaults when it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using default configuration", path.display());
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for url in [&self.registry.lookup_url, &self.registry.download_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidRegistryUrl(url.clone()));
            }
        }

        self.headers()?;

        Ok(())
    }

    /// Resolved destination root.
    pub fn destination_path(&self) -> Result<PathBuf> {
        resolve_path(&self.destination)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.http.timeout.map(Duration::from_secs)
    }

    /// Configured headers split into name/value pairs.
    pub fn headers(&self) -> Result<Vec<(String, String)>> {
        self.http
            .headers
            .iter()
            .map(|header| {
                header
                    .split_once(':')
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| ConfigError::InvalidHeader(header.clone()))
            })
            .collect()
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Writes the default configuration to [`CONFIG_PATH`].
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, Config::default().to_toml()?)?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.destination, "./collections");
        assert!(!config.skip_existing);
        assert_eq!(config.registry.lookup_url, DEFAULT_LOOKUP_URL);
        assert_eq!(config.registry.download_url, "https://galaxy.ansible.com");
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
destination = "/srv/galaxy"
skip_existing = true

[http]
timeout = 120
headers = ["Accept: application/json"]

[[collections]]
namespace = "community"
collection = "general"
constraint = ">=2.0.0"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.destination_path().unwrap(), PathBuf::from("/srv/galaxy"));
        assert!(config.skip_existing);
        assert_eq!(config.registry, RegistryConfig::default());
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));
        assert_eq!(
            config.headers().unwrap(),
            vec![("Accept".to_string(), "application/json".to_string())]
        );
        assert_eq!(config.collections.len(), 1);
        assert_eq!(config.collections[0].constraint(), Some(">=2.0.0"));
    }

    #[test]
    fn test_invalid_registry_url() {
        let mut config = Config::default();
        config.registry.download_url = "galaxy.ansible.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegistryUrl(_))
        ));
    }

    #[test]
    fn test_invalid_header() {
        let mut config = Config::default();
        config.http.headers = vec!["no-colon".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("destination = \"./collections\""));
        assert!(toml.contains("[registry]"));
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    #[serial]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let previous = config_path();
        set_config_path(path.clone());

        assert_eq!(generate_default_config().unwrap(), path);
        assert!(path.is_file());
        assert!(matches!(
            generate_default_config(),
            Err(ConfigError::ConfigAlreadyExists)
        ));
        assert_eq!(Config::new().unwrap(), Config::default());

        set_config_path(previous);
    }
}
