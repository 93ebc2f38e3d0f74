use std::{
    fs::{self, File},
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::{debug, trace};
use ureq::{
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH},
        Response,
    },
    Body,
};

use crate::{
    error::DownloadError,
    http::Http,
    types::{FailedTransfer, OverwriteMode, Progress, Transfer},
    utils::{filename_from_header, filename_from_url, parse_url, partial_path, resolve_output_path},
};

pub struct Download {
    pub url: String,
    pub directory: PathBuf,
    pub overwrite: OverwriteMode,
    pub on_progress: Option<Box<dyn Fn(Progress) + Send + Sync>>,
}

impl Download {
    /// Creates a new `Download` for the given URL.
    ///
    /// Defaults to the current directory, [`OverwriteMode::Force`] and no progress callback.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use grabber_dl::download::Download;
    ///
    /// let transfer = Download::new("https://example.com/archive.tar.gz")
    ///     .directory("collections/community/general")
    ///     .execute()
    ///     .expect("download failed");
    /// println!("{} bytes in {:?}", transfer.size, transfer.duration);
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            directory: PathBuf::from("."),
            overwrite: OverwriteMode::Force,
            on_progress: None,
        }
    }

    /// Sets the directory the artifact is written into.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Registers a callback invoked with `Progress::Starting`, `Progress::Chunk` and
    /// `Progress::Complete` during the transfer.
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Performs the download.
    ///
    /// The file name comes from the response's `Content-Disposition` header, falling back to
    /// the URL's last path segment. The body is streamed into a `.part` sibling and renamed
    /// into place once complete.
    ///
    /// On failure the returned [`FailedTransfer`] carries the bytes written and the time spent
    /// before the error.
    pub fn execute(self) -> Result<Transfer, FailedTransfer> {
        let started = Instant::now();
        let mut written = 0;

        match self.run(&mut written) {
            Ok(path) => {
                Ok(Transfer {
                    path,
                    size: written,
                    duration: started.elapsed(),
                })
            }
            Err(error) => {
                Err(FailedTransfer {
                    error,
                    size: written,
                    duration: started.elapsed(),
                })
            }
        }
    }

    fn run(&self, written: &mut u64) -> Result<PathBuf, DownloadError> {
        parse_url(&self.url)?;

        let url_filename = filename_from_url(&self.url);

        if self.overwrite == OverwriteMode::Skip {
            if let Some(existing) = url_filename.as_ref().map(|name| self.directory.join(name)) {
                if existing.is_file() {
                    debug!("{} exists, skipping download", existing.display());
                    *written = existing.metadata()?.len();
                    return Ok(existing);
                }
            }
        }

        let resp = Http::fetch(&self.url)?;

        let header_filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(filename_from_header);
        let output_path = resolve_output_path(&self.directory, url_filename, header_filename)?;

        if self.overwrite == OverwriteMode::Skip && output_path.is_file() {
            debug!("{} exists, skipping download", output_path.display());
            *written = output_path.metadata()?.len();
            return Ok(output_path);
        }

        fs::create_dir_all(&self.directory)?;

        let part = partial_path(&output_path);
        if let Err(err) = self.stream_to_file(resp, &part, written) {
            let _ = fs::remove_file(&part);
            return Err(err);
        }
        fs::rename(&part, &output_path)?;

        Ok(output_path)
    }

    fn stream_to_file(
        &self,
        resp: Response<Body>,
        path: &Path,
        written: &mut u64,
    ) -> Result<(), DownloadError> {
        let total = Self::parse_content_length(&resp);

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Starting {
                total,
            });
        }

        let mut file = File::create(path)?;
        let mut reader = resp.into_body().into_reader();
        let mut buffer = [0u8; 8192];

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])?;
            *written += n as u64;

            if let Some(ref cb) = self.on_progress {
                cb(Progress::Chunk {
                    current: *written,
                    total,
                });
            }
        }

        file.flush()?;
        trace!("wrote {} bytes to {}", written, path.display());

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Complete {
                total: *written,
            });
        }

        Ok(())
    }

    /// Size announced by the `Content-Length` header, or 0 when absent.
    fn parse_content_length(resp: &Response<Body>) -> u64 {
        resp.headers()
            .get(CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .and_then(|len| len.parse::<u64>().ok())
            .unwrap_or(0)
    }
}
