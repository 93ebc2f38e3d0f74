use std::path::PathBuf;

use grabber_registry::RegistryError;
use miette::Diagnostic;
use thiserror::Error;

use crate::filter::ParseError;

/// Errors that abort the resolution of a collection.
///
/// Failed artifact transfers are not errors at this level; they are recorded as
/// [`OutcomeStatus::Failure`](crate::outcome::OutcomeStatus::Failure).
#[derive(Error, Diagnostic, Debug)]
pub enum GrabError {
    #[error("Error while {action} `{}`: {source}", path.display())]
    #[diagnostic(
        code(grabber_core::storage),
        help("Check that the destination is writable and has free space")
    )]
    Storage {
        action: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, GrabError>;

/// Attaches the action and path to I/O failures.
pub trait ErrorContext<T> {
    fn with_context<P, C>(self, path: P, action: C) -> Result<T>
    where
        P: Into<PathBuf>,
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<P, C>(self, path: P, action: C) -> Result<T>
    where
        P: Into<PathBuf>,
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            GrabError::Storage {
                action: action(),
                path: path.into(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let res: std::io::Result<()> = Err(std::io::Error::other("disk full"));
        let err = res
            .with_context("/srv/galaxy/community/general/index.json", || {
                "writing".to_string()
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error while writing `/srv/galaxy/community/general/index.json`: disk full"
        );
    }

    #[test]
    fn test_registry_error_is_transparent() {
        let err = GrabError::from(RegistryError::InvalidUrl("x".into()));
        assert_eq!(err.to_string(), "Invalid URL: x");
    }
}
