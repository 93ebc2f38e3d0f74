//! Error types for the registry crate.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while looking up or handling collection metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(grabber_registry::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(
        code(grabber_registry::http),
        help("Check your network connection and the registry URL")
    )]
    UreqError(#[from] ureq::Error),

    #[error("Registry returned HTTP {status} for {url}")]
    #[diagnostic(
        code(grabber_registry::http_status),
        help("Verify the namespace and collection name exist on the registry")
    )]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    #[diagnostic(
        code(grabber_registry::json),
        help("The registry response is not a collection description")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    #[diagnostic(
        code(grabber_registry::invalid_url),
        help("Ensure the URL is valid and properly formatted")
    )]
    InvalidUrl(String),

    #[error("{0}")]
    #[diagnostic(code(grabber_registry::custom))]
    Custom(String),
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::InvalidUrl("bad-url".to_string());
        assert_eq!(err.to_string(), "Invalid URL: bad-url");

        let err = RegistryError::HttpStatus {
            status: 404,
            url: "https://galaxy.ansible.com/api/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Registry returned HTTP 404 for https://galaxy.ansible.com/api/"
        );
    }

    #[test]
    fn test_with_context() {
        let res: std::io::Result<()> = Err(std::io::Error::other("boom"));
        let err = res.with_context(|| "reading response".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Error while reading response: boom");
    }
}
