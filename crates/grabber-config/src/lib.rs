pub mod collection;
pub mod config;
pub mod error;
pub mod path;

pub use collection::{load_collections, CollectionSpec};
pub use config::{Config, HttpConfig, RegistryConfig, CONFIG_PATH};
pub use error::{ConfigError, Result};
