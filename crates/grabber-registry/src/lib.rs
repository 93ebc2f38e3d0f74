//! Registry access for galaxy-grabber.
//!
//! This crate knows how to ask an Ansible Galaxy compatible registry for the
//! description of a single collection and how that description is shaped.
//!
//! # Example
//!
//! ```no_run
//! use grabber_registry::{GalaxyClient, RegistryClient};
//!
//! fn list_versions() -> grabber_registry::Result<()> {
//!     let client = GalaxyClient::new(grabber_registry::DEFAULT_LOOKUP_URL)?;
//!     let metadata = client.lookup("community", "general")?;
//!     for record in metadata.versions() {
//!         println!("{} -> {}", record.version, record.download_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod metadata;

pub use client::{GalaxyClient, RegistryClient, DEFAULT_DOWNLOAD_URL, DEFAULT_LOOKUP_URL};
pub use error::{ErrorContext, RegistryError, Result};
pub use metadata::{CollectionData, CollectionDetail, CollectionMetadata, VersionRecord};
