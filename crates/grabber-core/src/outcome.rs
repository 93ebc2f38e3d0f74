use std::{path::PathBuf, time::Duration};

use grabber_config::CollectionSpec;
use serde::{Serialize, Serializer};

/// Result of processing a single published version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Rejected by the version filter; nothing was fetched.
    Skipped,
    Success {
        size: u64,
        #[serde(rename = "duration_ms", serialize_with = "as_millis")]
        duration: Duration,
    },
    #[serde(rename = "failed")]
    Failure {
        size: u64,
        #[serde(rename = "duration_ms", serialize_with = "as_millis")]
        duration: Duration,
        error: String,
    },
}

impl OutcomeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Success {
                ..
            } => "success",
            Self::Failure {
                ..
            } => "failed",
        }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis().try_into().unwrap_or(u64::MAX))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub version: String,
    /// Absolute artifact link, resolved even when the version was skipped.
    pub url: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl DownloadOutcome {
    pub fn skipped(version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
            status: OutcomeStatus::Skipped,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failure { .. })
    }
}

/// Ordered outcome narrative of one completed resolution.
#[derive(Clone, Debug, Serialize)]
pub struct CollectionReport {
    #[serde(serialize_with = "as_display")]
    pub spec: CollectionSpec,
    pub directory: PathBuf,
    pub outcomes: Vec<DownloadOutcome>,
}

fn as_display<S: Serializer>(spec: &CollectionSpec, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(spec)
}

impl CollectionReport {
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Skipped))
    }

    pub fn succeeded(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Success { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failure { .. }))
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = DownloadOutcome {
            version: "1.0.0".into(),
            url: "https://galaxy.ansible.com/a.tar.gz".into(),
            status: OutcomeStatus::Failure {
                size: 12,
                duration: Duration::from_millis(1500),
                error: "HTTP 502".into(),
            },
        };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "version": "1.0.0",
                "url": "https://galaxy.ansible.com/a.tar.gz",
                "status": "failed",
                "size": 12,
                "duration_ms": 1500,
                "error": "HTTP 502",
            })
        );

        let skipped = DownloadOutcome::skipped("0.1.0", "https://x/y");
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            json!({"version": "0.1.0", "url": "https://x/y", "status": "skipped"})
        );
    }

    #[test]
    fn test_report_counts() {
        let success = |v: &str| {
            DownloadOutcome {
                version: v.into(),
                url: String::new(),
                status: OutcomeStatus::Success {
                    size: 1,
                    duration: Duration::ZERO,
                },
            }
        };
        let report = CollectionReport {
            spec: CollectionSpec::new("community", "general", None).unwrap(),
            directory: PathBuf::from("/tmp/community/general"),
            outcomes: vec![
                success("1.0.0"),
                DownloadOutcome::skipped("0.9.0", ""),
                success("1.1.0"),
            ],
        };

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            serde_json::to_value(&report).unwrap()["spec"],
            json!("community.general")
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(OutcomeStatus::Skipped.label(), "skipped");
        assert_eq!(
            OutcomeStatus::Failure {
                size: 0,
                duration: Duration::ZERO,
                error: String::new()
            }
            .label(),
            "failed"
        );
    }
}
