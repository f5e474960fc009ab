//! Global error handling for promptgen
//!
//! Filesystem failures met while walking or reading are classified into
//! [`FsErrorKind`] and recovered where they happen. Only listing failures at the
//! browser's location, configuration problems and a failed artifact write ever
//! travel up as a [`PromptGenError`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a filesystem failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    /// The entry exists but may not be read
    PermissionDenied,
    /// The entry does not exist (or vanished between listing and reading)
    NotFound,
    /// Any other I/O failure
    Other,
}

impl FsErrorKind {
    /// Classify an I/O error
    pub fn of(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("Permission Denied"),
            Self::NotFound => f.write_str("File Not Found"),
            Self::Other => f.write_str("I/O Error"),
        }
    }
}

/// Global error type for promptgen operations
#[derive(Error, Debug)]
pub enum PromptGenError {
    /// A directory could not be listed
    #[error("{kind}: {}", .path.display())]
    Listing {
        path: PathBuf,
        kind: FsErrorKind,
        #[source]
        source: io::Error,
    },

    /// The generated artifact could not be persisted
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PromptGenError {
    /// Wrap a failed directory read
    pub fn listing(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Listing {
            path: path.into(),
            kind: FsErrorKind::of(&source),
            source,
        }
    }

    /// One-line message suitable for a status bar
    pub fn short_message(&self) -> String {
        match self {
            Self::Listing { kind: FsErrorKind::Other, source, .. } => source.to_string(),
            Self::Listing { kind, .. } => kind.to_string(),
            other => other.to_string(),
        }
    }
}

/// Specialized Result type for promptgen operations
pub type Result<T> = std::result::Result<T, PromptGenError>;

/// Creates a PromptGenError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::PromptGenError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Keeps `main` able to use `io::Result` like the rest of the CLI plumbing
impl From<PromptGenError> for io::Error {
    fn from(err: PromptGenError) -> Self {
        match err {
            PromptGenError::Io(e) => e,
            PromptGenError::Listing { source, .. } | PromptGenError::Write { source, .. } => source,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_io_errors() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        let other = io::Error::new(io::ErrorKind::InvalidData, "bad");

        assert_eq!(FsErrorKind::of(&denied), FsErrorKind::PermissionDenied);
        assert_eq!(FsErrorKind::of(&missing), FsErrorKind::NotFound);
        assert_eq!(FsErrorKind::of(&other), FsErrorKind::Other);
    }

    #[test]
    fn test_listing_short_message() {
        let err = PromptGenError::listing(
            "/srv/locked",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.short_message(), "Permission Denied");

        let err = PromptGenError::listing(
            "/srv/gone",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.short_message(), "File Not Found");
    }

    #[test]
    fn test_macros_build_config_errors() {
        fn check(flag: bool) -> Result<()> {
            crate::ensure!(flag, Config, "flag was {}", flag);
            Ok(())
        }

        assert!(check(true).is_ok());
        let err = check(false).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: flag was false");
    }
}
