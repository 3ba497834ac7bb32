//! Error types for loader construction and resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

/// A location handed to the factory was malformed.
///
/// Raised at construction time, before any loader exists. Fatal: the caller
/// must fix the location set, there is nothing to retry.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The path does not exist.
    #[error("location `{}` does not exist", .0.display())]
    Missing(PathBuf),
    /// The path exists but could not be read.
    #[error("location `{}` could not be read", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The path is a file but not a well-formed archive.
    #[error("location `{}` is not a well-formed archive", .path.display())]
    MalformedArchive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// A unit could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No location in the full local-then-parent chain provides the name.
    #[error("unit `{0}` was not found in any location or parent")]
    NotFound(String),
    /// A local location provides the name but its bytes could not be read.
    ///
    /// Not cached: a later `resolve_unit` of the same name runs the search
    /// again, so this is retryable, unlike [`ResolveError::NotFound`].
    #[error("unit `{}` could not be defined from `{}`", .name, .origin.display())]
    Definition {
        name: String,
        origin: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// The symbolic name the failed resolution was asked for.
    pub fn unit_name(&self) -> &str {
        match self {
            ResolveError::NotFound(name) => name,
            ResolveError::Definition { name, .. } => name,
        }
    }
}

/// A merged resource enumeration was polled again after reporting exhaustion.
///
/// This is a programming error on the caller's side; enumerations are
/// single-pass and a fresh one must be requested for re-iteration.
#[derive(Debug, Error)]
#[error("resource enumeration is exhausted")]
pub struct ExhaustedError;
