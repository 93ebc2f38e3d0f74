use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use ureq::http::HeaderValue;
use url::Url;

use crate::error::DownloadError;

/// Parse `url`, mapping failures to [`DownloadError::InvalidUrl`].
pub fn parse_url(url: &str) -> Result<Url, DownloadError> {
    Url::parse(url).map_err(|source| {
        DownloadError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    })
}

/// Extract filename from URL path
pub fn filename_from_url(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|s| !s.is_empty())
            .and_then(|s| {
                percent_decode_str(s)
                    .decode_utf8()
                    .ok()
                    .map(|cow| cow.into_owned())
            })
    })
}

/// Extract filename from Content-Disposition header
pub fn filename_from_header(value: &HeaderValue) -> Option<String> {
    value
        .to_str()
        .ok()?
        .split(';')
        .find_map(|p| p.trim().strip_prefix("filename="))
        .map(|s| s.trim_matches('"').to_string())
        .map(|s| {
            s.split(['/', '\\'])
                .next_back()
                .map(String::from)
                .unwrap_or(s)
        })
        .filter(|s| !s.is_empty() && s != "." && s != "..")
}

/// Determine the output path inside `directory`.
///
/// The header-provided name wins over the URL's last path segment.
pub fn resolve_output_path(
    directory: &Path,
    url_filename: Option<String>,
    header_filename: Option<String>,
) -> Result<PathBuf, DownloadError> {
    header_filename
        .or(url_filename)
        .map(|filename| directory.join(filename))
        .ok_or(DownloadError::NoFilename)
}

/// Sibling path used while a transfer is in flight.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
