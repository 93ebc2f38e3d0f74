//! Per-collection resolution pipeline.
//!
//! [`CollectionResolver`] drives one [`CollectionSpec`](grabber_config::CollectionSpec)
//! through storage preparation, metadata lookup and persistence, version filtering and
//! artifact download, producing one [`DownloadOutcome`] per published version.

pub mod error;
pub mod filter;
pub mod outcome;
pub mod reporter;
pub mod resolver;
pub mod storage;

pub use error::{ErrorContext, GrabError, Result};
pub use filter::{Alternative, ParseError, VersionFilter};
pub use outcome::{CollectionReport, DownloadOutcome, OutcomeStatus};
pub use reporter::{
    CollectorReporter, FatalContext, NullReporter, Reporter, ReporterHandle, Step,
};
pub use resolver::{resolve_download_link, CollectionResolver, ResolveState};
