//! Media library indexing
//!
//! Walks a `Library` folder of e-books and comic archives, caches a cover
//! thumbnail for each one it can read, and writes the folder tree out as a
//! `library-data.js` file for the viewer.
//!
//! - `sanitize` - cache keys for thumbnails
//! - `cover` - finding cover images inside `.epub` / `.cbz` / `.zip`
//! - `preview` - thumbnail generation and caching
//! - `library` - the tree, the directory walk and the data artifact
//! - `refresh` - the refresh entry point used by the host
//! - `config` - paths and preview settings

pub mod config;
pub mod cover;
pub mod error;
pub mod library;
pub mod preview;
pub mod refresh;
pub mod sanitize;

pub use config::{LibraryConfig, PreviewSettings};
pub use error::{Error, Result};
pub use library::{FileNode, FolderNode, LibraryNode};
pub use preview::{PreviewGenerator, PreviewResult};
pub use refresh::{Indexer, RefreshReport, RefreshResponse};
