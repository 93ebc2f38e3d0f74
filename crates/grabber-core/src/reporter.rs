//! Presentation seam for resolution progress.
//!
//! The resolver never decides how outcomes are displayed; it forwards them to a
//! [`Reporter`] supplied by the caller.

use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex},
};

use grabber_config::CollectionSpec;

use crate::{
    error::GrabError,
    outcome::{CollectionReport, DownloadOutcome},
};

/// Resolution step that failed fatally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    PrepareStorage,
    FetchMetadata,
    PersistMetadata,
    BuildFilter,
    FilterVersion,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrepareStorage => "prepare storage",
            Self::FetchMetadata => "fetch metadata",
            Self::PersistMetadata => "persist metadata",
            Self::BuildFilter => "build filter",
            Self::FilterVersion => "filter version",
        };
        f.write_str(name)
    }
}

/// Where a fatal error happened and with which inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FatalContext {
    pub namespace: String,
    pub name: String,
    pub step: Step,
    pub params: Vec<(&'static str, String)>,
}

impl FatalContext {
    pub fn new(spec: &CollectionSpec, step: Step) -> Self {
        Self {
            namespace: spec.namespace().to_string(),
            name: spec.name().to_string(),
            step,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// Parameters rendered as `key=value` pairs.
    pub fn params_display(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Receives resolution progress.
///
/// Each frontend provides its own implementation.
pub trait Reporter: Send + Sync {
    fn collection_started(&self, _spec: &CollectionSpec, _directory: &Path) {}

    fn progress(&self, outcome: &DownloadOutcome);

    fn report_fatal(&self, error: &GrabError, context: &FatalContext);

    fn collection_finished(&self, _report: &CollectionReport) {}
}

pub type ReporterHandle = Arc<dyn Reporter>;

/// No-op reporter for tests or headless operation.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn progress(&self, _outcome: &DownloadOutcome) {}

    fn report_fatal(&self, _error: &GrabError, _context: &FatalContext) {}
}

/// Reporter that stores everything it receives for inspection.
#[derive(Default)]
pub struct CollectorReporter {
    started: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<DownloadOutcome>>,
    fatals: Mutex<Vec<(String, FatalContext)>>,
    finished: Mutex<Vec<String>>,
}

impl CollectorReporter {
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<DownloadOutcome> {
        self.outcomes.lock().unwrap().clone()
    }

    /// Rendered error message and context of each fatal report.
    pub fn fatals(&self) -> Vec<(String, FatalContext)> {
        self.fatals.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl Reporter for CollectorReporter {
    fn collection_started(&self, spec: &CollectionSpec, _directory: &Path) {
        self.started.lock().unwrap().push(spec.to_string());
    }

    fn progress(&self, outcome: &DownloadOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }

    fn report_fatal(&self, error: &GrabError, context: &FatalContext) {
        self.fatals
            .lock()
            .unwrap()
            .push((error.to_string(), context.clone()));
    }

    fn collection_finished(&self, report: &CollectionReport) {
        self.finished.lock().unwrap().push(report.spec.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_context_params() {
        let spec = CollectionSpec::new("community", "general", Some(">=1".into())).unwrap();
        let ctx = FatalContext::new(&spec, Step::BuildFilter).param("constraint", ">=1");
        assert_eq!(ctx.namespace, "community");
        assert_eq!(ctx.name, "general");
        assert_eq!(ctx.params_display(), "constraint=>=1");
        assert_eq!(ctx.step.to_string(), "build filter");
    }

    #[test]
    fn test_collector_records_progress() {
        let reporter = CollectorReporter::default();
        reporter.progress(&DownloadOutcome::skipped("1.0.0", "u"));
        reporter.progress(&DownloadOutcome::skipped("2.0.0", "v"));

        let versions: Vec<_> = reporter
            .outcomes()
            .into_iter()
            .map(|o| o.version)
            .collect();
        assert_eq!(versions, ["1.0.0", "2.0.0"]);
        assert!(reporter.fatals().is_empty());
    }
}
