use std::path::Path;

use crate::types::{FailedTransfer, Transfer};

/// Transfers a single resource into a directory.
pub trait Fetcher {
    fn fetch(&self, url: &str, directory: &Path) -> Result<Transfer, FailedTransfer>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, url: &str, directory: &Path) -> Result<Transfer, FailedTransfer> {
        (**self).fetch(url, directory)
    }
}
