use std::{path::Path, sync::Arc};

use crate::{
    download::Download,
    traits::Fetcher,
    types::{FailedTransfer, OverwriteMode, Progress, Transfer},
};

/// Progress callback shared across downloads; receives the URL being transferred.
pub type ProgressCallback = Arc<dyn Fn(&str, Progress) + Send + Sync>;

/// [`Fetcher`] backed by the shared HTTP agent.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    overwrite: OverwriteMode,
    on_progress: Option<ProgressCallback>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, directory: &Path) -> Result<Transfer, FailedTransfer> {
        let mut download = Download::new(url)
            .directory(directory)
            .overwrite(self.overwrite);

        if let Some(cb) = self.on_progress.clone() {
            let url = url.to_string();
            download = download.progress(move |progress| cb(&url, progress));
        }

        download.execute()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::error::DownloadError;

    #[test]
    fn test_http_fetcher_skips_existing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ns-name-2.1.0.tar.gz"), b"12345").unwrap();

        let fetcher = HttpFetcher::new().overwrite(OverwriteMode::Skip);
        let transfer = fetcher
            .fetch("https://galaxy.invalid/dl/ns-name-2.1.0.tar.gz", dir.path())
            .unwrap();
        assert_eq!(transfer.size, 5);
    }

    #[test]
    fn test_http_fetcher_relative_url() {
        let dir = tempdir().unwrap();
        let fetcher = HttpFetcher::new().progress(Arc::new(|_, _| {}));
        let err = fetcher.fetch("dl/ns-name-2.1.0.tar.gz", dir.path()).unwrap_err();
        assert!(matches!(err.error, DownloadError::InvalidUrl { .. }));
    }
}
