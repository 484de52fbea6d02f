//! Paths and fixed settings for a library refresh
//!
//! The host decides the base directory once and builds a `LibraryConfig`
//! from it. Only `default_base_dir` looks at the environment, and only the
//! host calls it.

use std::path::{Path, PathBuf};

/// Name of the folder holding the user's books and comics
pub const LIBRARY_DIR_NAME: &str = "Library";
/// Name of the thumbnail cache folder
pub const PREVIEWS_DIR_NAME: &str = "previews";
/// Name of the data artifact consumed by the viewer
pub const OUTPUT_FILE_NAME: &str = "library-data.js";
/// Overrides the default base directory when set
pub const HOME_ENV_VAR: &str = "MEDIA_SHELF_HOME";

/// Thumbnail output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Thumbnail width in pixels; height follows the aspect ratio
    pub width: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        PreviewSettings {
            width: 300,
            quality: 80,
        }
    }
}

/// Where a refresh reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Anchor for every relative path in the artifact (parent of `library_root`)
    pub base_dir: PathBuf,
    pub library_root: PathBuf,
    pub previews_dir: PathBuf,
    pub output_path: PathBuf,
    pub preview: PreviewSettings,
}

impl LibraryConfig {
    /// Standard layout under a base directory:
    /// - `<base>/Library`
    /// - `<base>/previews`
    /// - `<base>/library-data.js`
    pub fn from_base_dir(base: impl Into<PathBuf>) -> Self {
        let base_dir = base.into();
        LibraryConfig {
            library_root: base_dir.join(LIBRARY_DIR_NAME),
            previews_dir: base_dir.join(PREVIEWS_DIR_NAME),
            output_path: base_dir.join(OUTPUT_FILE_NAME),
            base_dir,
            preview: PreviewSettings::default(),
        }
    }

    /// Get the default base directory for the host
    ///
    /// - `$MEDIA_SHELF_HOME` if set
    /// - Linux: ~/.local/share/media-shelf
    /// - macOS: ~/Library/Application Support/media-shelf
    /// - Windows: %APPDATA%\media-shelf
    /// - otherwise the current directory
    pub fn default_base_dir() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return PathBuf::from(home);
        }

        match dirs::data_dir() {
            Some(mut path) => {
                path.push("media-shelf");
                path
            }
            None => PathBuf::from("."),
        }
    }

    pub fn with_preview_settings(mut self, preview: PreviewSettings) -> Self {
        self.preview = preview;
        self
    }

    /// Path of a cache file inside the previews directory
    pub fn preview_path(&self, file_name: &str) -> PathBuf {
        self.previews_dir.join(file_name)
    }

    /// Reference to a cache file as written into the artifact
    pub fn preview_reference(&self, file_name: &str) -> String {
        let dir = self
            .previews_dir
            .strip_prefix(&self.base_dir)
            .map(forward_slashes)
            .unwrap_or_else(|_| PREVIEWS_DIR_NAME.to_string());
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }

    /// `path` relative to the base directory with `/` separators
    pub fn relative_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.base_dir) {
            Ok(rel) => forward_slashes(rel),
            Err(_) => forward_slashes(path),
        }
    }
}

/// Join path components with `/` whatever the host separator is
pub fn forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_base_dir() {
        let config = LibraryConfig::from_base_dir("/data/shelf");
        assert_eq!(config.library_root, Path::new("/data/shelf/Library"));
        assert_eq!(config.previews_dir, Path::new("/data/shelf/previews"));
        assert_eq!(config.output_path, Path::new("/data/shelf/library-data.js"));
        assert_eq!(config.preview, PreviewSettings { width: 300, quality: 80 });
    }

    #[test]
    fn test_relative_references() {
        let config = LibraryConfig::from_base_dir("/data/shelf");
        assert_eq!(config.preview_reference("Dune.jpg"), "previews/Dune.jpg");
        assert_eq!(
            config.relative_path(Path::new("/data/shelf/Library/Sci Fi/Dune.epub")),
            "Library/Sci Fi/Dune.epub"
        );
    }
}
