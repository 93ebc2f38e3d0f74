use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(grabber_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(grabber_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("JSON deserialization error: {0}")]
    #[diagnostic(
        code(grabber_config::json),
        help("Expected {{\"collections\": [...]}} or a bare array of collections")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(grabber_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Collections file not found: {0}")]
    #[diagnostic(code(grabber_config::collections_not_found))]
    CollectionsFileNotFound(String),

    #[error("Invalid collection `{input}`: {reason}")]
    #[diagnostic(
        code(grabber_config::invalid_collection),
        help("Collections are written as `namespace.name` or `namespace.name:constraint`")
    )]
    InvalidCollection { input: String, reason: String },

    #[error("Invalid registry URL: {0}")]
    #[diagnostic(
        code(grabber_config::invalid_registry_url),
        help("Registry URLs must start with http:// or https://")
    )]
    InvalidRegistryUrl(String),

    #[error("Invalid header `{0}`")]
    #[diagnostic(
        code(grabber_config::invalid_header),
        help("Headers are written as `Name: value`")
    )]
    InvalidHeader(String),

    #[error("Path is empty")]
    #[diagnostic(code(grabber_config::empty_path))]
    EmptyPath,

    #[error("Environment variable `{var}` not set in `{input}`")]
    #[diagnostic(code(grabber_config::missing_env_var))]
    MissingEnvVar { var: String, input: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(grabber_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
