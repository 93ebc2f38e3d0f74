use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(grabber_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(grabber_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(grabber_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(grabber_dl::io))]
    Io(#[from] std::io::Error),

    #[error("File name could not be determined")]
    #[diagnostic(
        code(grabber_dl::no_filename),
        help("The URL must end with a file name or the server must send Content-Disposition")
    )]
    NoFilename,
}

impl From<ureq::Error> for DownloadError {
    /// Converts a `ureq::Error` into a `DownloadError`.
    ///
    /// Status code errors are mapped to [`DownloadError::HttpError`] without a URL; callers
    /// that know the URL should prefer [`DownloadError::from_ureq`].
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(status) => {
                Self::HttpError {
                    status,
                    url: String::new(),
                }
            }
            other => Self::Network(Box::new(other)),
        }
    }
}

impl DownloadError {
    /// Same as the `From` conversion, but keeps the requested URL on HTTP status errors.
    pub fn from_ureq(e: ureq::Error, url: &str) -> Self {
        match e {
            ureq::Error::StatusCode(status) => {
                Self::HttpError {
                    status,
                    url: url.to_string(),
                }
            }
            other => Self::Network(Box::new(other)),
        }
    }
}
