use std::{path::PathBuf, time::Duration};

use crate::error::DownloadError;

/// Download progress events
#[derive(Debug, Clone, Copy)]
pub enum Progress {
    Starting { total: u64 },
    Chunk { current: u64, total: u64 },
    Complete { total: u64 },
}

/// How to handle files that already exist at the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwriteMode {
    /// Keep the existing file and report it as transferred.
    Skip,
    /// Replace the existing file.
    #[default]
    Force,
}

/// A completed transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub path: PathBuf,
    pub size: u64,
    pub duration: Duration,
}

/// A transfer that failed, with whatever was moved before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct FailedTransfer {
    #[source]
    pub error: DownloadError,
    pub size: u64,
    pub duration: Duration,
}
