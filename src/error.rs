//! Error types for the indexing pipeline
//!
//! Only genuine failures live here. "No cover in this book", "cover entry
//! referenced but missing" and "no Library folder yet" are ordinary outcomes
//! and are modelled as `Ok(None)`, `PreviewResult::NoCover` or an empty tree.

use std::path::PathBuf;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file is not a readable zip container
    #[error("container could not be opened: {0}")]
    ContainerCorrupt(#[from] zip::result::ZipError),

    /// A manifest entry the e-book format requires is absent
    #[error("required manifest entry not found: {0}")]
    ManifestMissing(String),

    /// A manifest entry exists but does not describe what it should
    #[error("manifest {entry} is invalid: {reason}")]
    ManifestInvalid { entry: String, reason: String },

    /// Cover bytes could not be decoded, resized or re-encoded
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// The data artifact or a thumbnail could not be persisted
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The library folder (or a source file) exists but cannot be read
    #[error("failed to read {}: {source}", path.display())]
    LibraryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tree could not be turned into (or read back from) JSON
    #[error("library data is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Another refresh is still running
    #[error("a library refresh is already in progress")]
    RefreshInProgress,

    /// The blocking scan worker panicked or was cancelled
    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn invalid_manifest(entry: impl Into<String>, reason: impl ToString) -> Self {
        Error::ManifestInvalid {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }
}
