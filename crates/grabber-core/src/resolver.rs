use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use grabber_config::CollectionSpec;
use grabber_dl::traits::Fetcher;
use grabber_registry::{CollectionMetadata, RegistryClient, RegistryError, VersionRecord};
use tracing::{debug, error, trace};

use crate::{
    error::{GrabError, Result},
    filter::VersionFilter,
    outcome::{CollectionReport, DownloadOutcome, OutcomeStatus},
    reporter::{FatalContext, NullReporter, ReporterHandle, Step},
    storage::{self, INDEX_FILE},
};

/// Lifecycle of a single collection resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveState {
    Init,
    DirectoryReady,
    MetadataFetched,
    MetadataPersisted,
    FilterReady,
    Iterating,
    Done,
    Failed,
}

impl fmt::Display for ResolveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Absolute link of an artifact: the registry path appended to the download prefix.
pub fn resolve_download_link(path: &str, prefix: &str) -> String {
    format!("{prefix}{path}")
}

/// Drives collections through storage, metadata, filtering and download.
pub struct CollectionResolver<R, F> {
    registry: R,
    fetcher: F,
    download_prefix: String,
    reporter: ReporterHandle,
}

impl<R: RegistryClient, F: Fetcher> CollectionResolver<R, F> {
    pub fn new(registry: R, fetcher: F, download_prefix: impl Into<String>) -> Self {
        Self {
            registry,
            fetcher,
            download_prefix: download_prefix.into(),
            reporter: Arc::new(NullReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: ReporterHandle) -> Self {
        self.reporter = reporter;
        self
    }

    /// Creates `destination_root/namespace/name` and returns it.
    pub fn prepare_storage(
        &self,
        spec: &CollectionSpec,
        destination_root: &Path,
    ) -> Result<PathBuf> {
        let directory = storage::collection_dir(destination_root, spec.namespace(), spec.name());
        storage::ensure_dir(&directory)?;
        Ok(directory)
    }

    /// Queries the registry once for the collection's version listing.
    pub fn fetch_metadata(&self, spec: &CollectionSpec) -> Result<CollectionMetadata> {
        Ok(self.registry.lookup(spec.namespace(), spec.name())?)
    }

    /// Writes the metadata as pretty JSON to `directory/index.json`, replacing any previous
    /// snapshot.
    pub fn persist_metadata(
        &self,
        metadata: &CollectionMetadata,
        directory: &Path,
    ) -> Result<PathBuf> {
        let json = metadata.to_pretty_json().map_err(RegistryError::from)?;
        let path = directory.join(INDEX_FILE);
        storage::write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }

    pub fn build_filter(&self, constraint: Option<&str>) -> Result<VersionFilter> {
        let filter = VersionFilter::build(constraint)?;
        if filter.is_any() {
            debug!("no version constraint, every version is accepted");
        }
        Ok(filter)
    }

    /// Produces the outcome for one version.
    ///
    /// Transfer failures are recorded in the outcome. Only an unparsable version string is
    /// returned as an error.
    pub fn process_version(
        &self,
        record: &VersionRecord,
        filter: &VersionFilter,
        directory: &Path,
    ) -> Result<DownloadOutcome> {
        let url = resolve_download_link(&record.download_url, &self.download_prefix);

        if !filter.accepts(&record.version)? {
            trace!(version = %record.version, "rejected by filter");
            return Ok(DownloadOutcome::skipped(&record.version, url));
        }

        let status = match self.fetcher.fetch(&url, directory) {
            Ok(transfer) => {
                debug!(
                    "Downloaded {} ({} bytes) to {}",
                    url,
                    transfer.size,
                    transfer.path.display()
                );
                OutcomeStatus::Success {
                    size: transfer.size,
                    duration: transfer.duration,
                }
            }
            Err(failed) => {
                debug!(version = %record.version, "download of {} failed: {}", url, failed);
                OutcomeStatus::Failure {
                    size: failed.size,
                    duration: failed.duration,
                    error: failed.to_string(),
                }
            }
        };

        Ok(DownloadOutcome {
            version: record.version.clone(),
            url,
            status,
        })
    }

    /// Resolves a collection end to end.
    ///
    /// Every listed version yields exactly one outcome, in registry order. Storage, registry
    /// and parse errors abort the collection; they are logged, handed to the reporter and
    /// returned.
    pub fn resolve(
        &self,
        spec: &CollectionSpec,
        destination_root: &Path,
    ) -> Result<CollectionReport> {
        let mut state = ResolveState::Init;
        trace!(collection = %spec, %state, "resolving");

        let directory = self.prepare_storage(spec, destination_root).map_err(|err| {
            let ctx = FatalContext::new(spec, Step::PrepareStorage)
                .param("destination", destination_root.display());
            self.fail(&mut state, err, ctx)
        })?;
        self.advance(spec, &mut state, ResolveState::DirectoryReady);
        self.reporter.collection_started(spec, &directory);

        let metadata = self.fetch_metadata(spec).map_err(|err| {
            let ctx = FatalContext::new(spec, Step::FetchMetadata)
                .param("namespace", spec.namespace())
                .param("name", spec.name());
            self.fail(&mut state, err, ctx)
        })?;
        self.advance(spec, &mut state, ResolveState::MetadataFetched);

        self.persist_metadata(&metadata, &directory).map_err(|err| {
            let ctx = FatalContext::new(spec, Step::PersistMetadata)
                .param("directory", directory.display());
            self.fail(&mut state, err, ctx)
        })?;
        self.advance(spec, &mut state, ResolveState::MetadataPersisted);

        let filter = self.build_filter(spec.constraint()).map_err(|err| {
            let ctx = FatalContext::new(spec, Step::BuildFilter)
                .param("constraint", spec.constraint().unwrap_or_default());
            self.fail(&mut state, err, ctx)
        })?;
        self.advance(spec, &mut state, ResolveState::FilterReady);

        let records = metadata.versions();
        self.advance(spec, &mut state, ResolveState::Iterating);

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.process_version(record, &filter, &directory).map_err(|err| {
                let ctx = FatalContext::new(spec, Step::FilterVersion)
                    .param("version", &record.version)
                    .param("constraint", spec.constraint().unwrap_or_default());
                self.fail(&mut state, err, ctx)
            })?;
            self.reporter.progress(&outcome);
            outcomes.push(outcome);
        }
        self.advance(spec, &mut state, ResolveState::Done);

        let report = CollectionReport {
            spec: spec.clone(),
            directory,
            outcomes,
        };
        self.reporter.collection_finished(&report);

        Ok(report)
    }

    fn advance(&self, spec: &CollectionSpec, state: &mut ResolveState, next: ResolveState) {
        trace!(collection = %spec, from = %*state, to = %next, "state transition");
        *state = next;
    }

    fn fail(&self, state: &mut ResolveState, err: GrabError, ctx: FatalContext) -> GrabError {
        error!(
            namespace = %ctx.namespace,
            name = %ctx.name,
            step = %ctx.step,
            params = %ctx.params_display(),
            from = %*state,
            "{}",
            err
        );
        *state = ResolveState::Failed;
        self.reporter.report_fatal(&err, &ctx);
        err
    }
}
