use std::path::Path;

use grabber_config::CollectionSpec;
use grabber_core::{
    CollectionReport, DownloadOutcome, FatalContext, GrabError, OutcomeStatus, Reporter,
};
use nu_ansi_term::Color::{Green, Magenta, Red, Yellow};
use serde_json::json;
use tracing::info;

use crate::{
    progress,
    utils::{format_bytes, format_duration, Colored},
};

/// Human readable outcome narrative.
pub struct TerminalReporter;

pub fn collection_header(spec: &CollectionSpec, directory: &Path) -> String {
    format!(
        "collection {} - {} (output: {}):",
        Colored(Magenta, spec.namespace()),
        Colored(Magenta, spec.name()),
        directory.display()
    )
}

pub fn outcome_line(outcome: &DownloadOutcome) -> String {
    let prefix = format!(" - v{}:", outcome.version);
    match &outcome.status {
        OutcomeStatus::Skipped => {
            format!(
                "{prefix} {} [URL: {}]",
                Colored(Yellow, "skipped"),
                outcome.url
            )
        }
        OutcomeStatus::Success {
            size,
            duration,
        } => {
            format!(
                "{prefix} {} [URL: {}, bytes: {size}, duration: {}]",
                Colored(Green, "success"),
                outcome.url,
                format_duration(*duration)
            )
        }
        OutcomeStatus::Failure {
            size,
            duration,
            error,
        } => {
            format!(
                "{prefix} {} [URL: {}, bytes: {size}, duration: {}, error: {error}]",
                Colored(Red, "failed"),
                outcome.url,
                format_duration(*duration)
            )
        }
    }
}

pub fn summary_line(report: &CollectionReport) -> String {
    let bytes: u64 = report
        .outcomes
        .iter()
        .map(|o| {
            match o.status {
                OutcomeStatus::Success {
                    size, ..
                } => size,
                _ => 0,
            }
        })
        .sum();

    format!(
        "{} downloaded ({}), {} skipped, {} failed",
        Colored(Green, report.succeeded()),
        format_bytes(bytes, 2),
        Colored(Yellow, report.skipped()),
        Colored(Red, report.failed())
    )
}

impl Reporter for TerminalReporter {
    fn collection_started(&self, spec: &CollectionSpec, directory: &Path) {
        info!("{}", collection_header(spec, directory));
    }

    fn progress(&self, outcome: &DownloadOutcome) {
        progress::finish_download();
        info!("{}", outcome_line(outcome));
    }

    fn report_fatal(&self, error: &GrabError, context: &FatalContext) {
        progress::finish_download();
        info!(
            "collection {} - {}: {} during {}: {}",
            Colored(Magenta, &context.namespace),
            Colored(Magenta, &context.name),
            Colored(Red, "aborted"),
            context.step,
            error
        );
    }

    fn collection_finished(&self, report: &CollectionReport) {
        info!("{}", summary_line(report));
    }
}

/// One JSON object per line on stdout.
pub struct JsonReporter;

impl JsonReporter {
    fn emit(value: serde_json::Value) {
        progress::suspend(|| println!("{value}"));
    }
}

impl Reporter for JsonReporter {
    fn collection_started(&self, spec: &CollectionSpec, directory: &Path) {
        Self::emit(json!({
            "event": "collection_started",
            "namespace": spec.namespace(),
            "name": spec.name(),
            "constraint": spec.constraint(),
            "directory": directory,
        }));
    }

    fn progress(&self, outcome: &DownloadOutcome) {
        progress::finish_download();
        let mut value = json!({ "event": "outcome" });
        if let (Some(map), Ok(serde_json::Value::Object(fields))) =
            (value.as_object_mut(), serde_json::to_value(outcome))
        {
            map.extend(fields);
        }
        Self::emit(value);
    }

    fn report_fatal(&self, error: &GrabError, context: &FatalContext) {
        progress::finish_download();
        let params: serde_json::Map<_, _> = context
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v.as_str())))
            .collect();
        Self::emit(json!({
            "event": "fatal",
            "namespace": context.namespace,
            "name": context.name,
            "step": context.step.to_string(),
            "params": params,
            "error": error.to_string(),
        }));
    }

    fn collection_finished(&self, report: &CollectionReport) {
        Self::emit(json!({
            "event": "collection_finished",
            "collection": report.spec.to_string(),
            "directory": report.directory,
            "succeeded": report.succeeded(),
            "skipped": report.skipped(),
            "failed": report.failed(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use serial_test::serial;

    use super::*;
    use crate::utils::set_color;

    fn spec() -> CollectionSpec {
        CollectionSpec::new("community", "general", None).unwrap()
    }

    #[test]
    #[serial]
    fn test_plain_narrative() {
        set_color(false);

        assert_eq!(
            collection_header(&spec(), Path::new("/srv/community/general")),
            "collection community - general (output: /srv/community/general):"
        );

        let skipped = DownloadOutcome::skipped("1.0.0", "https://g/a-1.0.0.tar.gz");
        assert_eq!(
            outcome_line(&skipped),
            " - v1.0.0: skipped [URL: https://g/a-1.0.0.tar.gz]"
        );

        let success = DownloadOutcome {
            version: "2.0.0".into(),
            url: "https://g/a-2.0.0.tar.gz".into(),
            status: OutcomeStatus::Success {
                size: 2048,
                duration: Duration::from_millis(250),
            },
        };
        assert_eq!(
            outcome_line(&success),
            " - v2.0.0: success [URL: https://g/a-2.0.0.tar.gz, bytes: 2048, duration: 250.00ms]"
        );

        let failed = DownloadOutcome {
            version: "3.0.0".into(),
            url: "https://g/a-3.0.0.tar.gz".into(),
            status: OutcomeStatus::Failure {
                size: 0,
                duration: Duration::from_secs(1),
                error: "HTTP 404: https://g/a-3.0.0.tar.gz".into(),
            },
        };
        assert_eq!(
            outcome_line(&failed),
            " - v3.0.0: failed [URL: https://g/a-3.0.0.tar.gz, bytes: 0, duration: 1.00s, \
             error: HTTP 404: https://g/a-3.0.0.tar.gz]"
        );

        let report = CollectionReport {
            spec: spec(),
            directory: PathBuf::from("/srv/community/general"),
            outcomes: vec![skipped, success, failed],
        };
        assert_eq!(
            summary_line(&report),
            "1 downloaded (2.00 KiB), 1 skipped, 1 failed"
        );
    }

    #[test]
    #[serial]
    fn test_colored_narrative() {
        set_color(true);
        let line = outcome_line(&DownloadOutcome::skipped("1.0.0", "u"));
        assert!(line.contains(&Yellow.paint("skipped").to_string()));
        set_color(false);
    }
}
