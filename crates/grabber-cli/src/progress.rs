use std::{
    sync::{Arc, LazyLock, Mutex, PoisonError},
    time::Duration,
};

use grabber_dl::{fetcher::ProgressCallback, types::Progress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::Cyan;

use crate::utils::progress_enabled;

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Bar of the transfer in flight.
static CURRENT: LazyLock<Mutex<Option<ProgressBar>>> = LazyLock::new(|| Mutex::new(None));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    finish_download();
    MULTI.clear().ok();
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix}  {wide_bar:.cyan/dim}  {bytes}/{total_bytes}  {bytes_per_sec}  {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━─")
}

/// Create a download progress bar with a progress bar, bytes, and ETA.
pub fn create_download_job(prefix: &str) -> ProgressBar {
    let pb = if progress_enabled() {
        MULTI.add(ProgressBar::new(0))
    } else {
        MULTI.add(ProgressBar::hidden())
    };
    pb.set_style(download_style());
    pb.set_prefix(Cyan.paint(prefix).to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Clears the bar of the current transfer, if any.
///
/// Failed transfers never send `Complete`, so their bar is dropped here.
pub fn finish_download() {
    let current = CURRENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(pb) = current {
        pb.finish_and_clear();
    }
}

/// Handle download progress events and update a progress bar.
pub fn handle_download_progress(state: Progress, pb: &ProgressBar) {
    match state {
        Progress::Starting {
            total,
        } => {
            pb.set_length(total);
        }
        Progress::Chunk {
            current, ..
        } => {
            pb.set_position(current);
        }
        Progress::Complete {
            total,
        } => {
            pb.set_position(total);
        }
    }
}

/// Callback for [`HttpFetcher`](grabber_dl::fetcher::HttpFetcher) that drives one bar per
/// transfer.
pub fn download_callback() -> ProgressCallback {
    Arc::new(|url: &str, state: Progress| {
        if matches!(state, Progress::Starting { .. }) {
            finish_download();
            let name = url.rsplit('/').next().unwrap_or(url);
            *CURRENT.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(create_download_job(name));
        }

        if let Some(pb) = CURRENT
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            handle_download_progress(state, pb);
        }

        if matches!(state, Progress::Complete { .. }) {
            finish_download();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_download_progress() {
        let pb = ProgressBar::hidden();
        handle_download_progress(
            Progress::Starting {
                total: 100,
            },
            &pb,
        );
        assert_eq!(pb.length(), Some(100));

        handle_download_progress(
            Progress::Chunk {
                current: 40,
                total: 100,
            },
            &pb,
        );
        assert_eq!(pb.position(), 40);

        handle_download_progress(
            Progress::Complete {
                total: 100,
            },
            &pb,
        );
        assert_eq!(pb.position(), 100);
    }
}
