//! Cover thumbnail generation and caching
//!
//! Thumbnails are keyed by the sanitized file stem and live in a flat
//! previews directory. An existing cache file is always reused as-is; the
//! source file's modification time is never consulted.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fs;
use std::path::Path;

use crate::config::{LibraryConfig, PreviewSettings};
use crate::cover::ContainerKind;
use crate::error::{Error, Result};
use crate::sanitize::sanitize;

/// What happened when asking for one file's preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewResult {
    /// A thumbnail was already in the cache
    Cached(String),
    /// A thumbnail was extracted and written on this run
    Generated(String),
    /// Not a container we read, or the container has no cover
    NoCover,
    /// Extraction or encoding failed; the file gets no preview
    Failed(String),
}

impl PreviewResult {
    /// The relative preview reference, if there is one
    pub fn reference(&self) -> Option<&str> {
        match self {
            PreviewResult::Cached(path) | PreviewResult::Generated(path) => Some(path),
            PreviewResult::NoCover | PreviewResult::Failed(_) => None,
        }
    }

    /// Reference as stored in the tree (empty when there is none)
    pub fn into_reference(self) -> String {
        match self {
            PreviewResult::Cached(path) | PreviewResult::Generated(path) => path,
            PreviewResult::NoCover | PreviewResult::Failed(_) => String::new(),
        }
    }
}

/// Produces cached thumbnails for library files
#[derive(Debug, Clone, Copy)]
pub struct PreviewGenerator<'a> {
    config: &'a LibraryConfig,
}

impl<'a> PreviewGenerator<'a> {
    pub fn new(config: &'a LibraryConfig) -> Self {
        PreviewGenerator { config }
    }

    /// Cache file name for a source file: `<sanitized stem>.jpg`
    pub fn cache_file_name(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}.jpg", sanitize(&stem))
    }

    /// Get or create the preview for one library file.
    ///
    /// Never fails: any error is logged and reported as `Failed`.
    pub fn generate(&self, path: &Path) -> PreviewResult {
        let file_name = Self::cache_file_name(path);
        let target = self.config.preview_path(&file_name);
        let reference = self.config.preview_reference(&file_name);

        if target.exists() {
            return PreviewResult::Cached(reference);
        }

        let Some(kind) = ContainerKind::from_path(path) else {
            return PreviewResult::NoCover;
        };

        match self.extract_and_save(kind, path, &target) {
            Ok(true) => {
                tracing::info!(file = %display_name(path), preview = %reference, "📸 Generated preview");
                PreviewResult::Generated(reference)
            }
            Ok(false) => {
                tracing::debug!(file = %display_name(path), "no cover found");
                PreviewResult::NoCover
            }
            Err(e) => {
                tracing::warn!(file = %display_name(path), error = %e, "could not process cover");
                PreviewResult::Failed(e.to_string())
            }
        }
    }

    /// Returns `Ok(false)` when the container has no cover
    fn extract_and_save(&self, kind: ContainerKind, path: &Path, target: &Path) -> Result<bool> {
        let bytes = fs::read(path).map_err(|source| Error::LibraryRead {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(cover) = kind.locate_cover(&bytes)? else {
            return Ok(false);
        };

        let jpeg = render_thumbnail(&cover, self.config.preview)?;
        fs::write(target, jpeg).map_err(|source| Error::OutputWrite {
            path: target.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

/// Decode cover bytes, scale to the configured width and encode as JPEG.
///
/// The whole thumbnail is built in memory so a failure never leaves a
/// partial file in the cache.
pub fn render_thumbnail(cover: &[u8], settings: PreviewSettings) -> Result<Vec<u8>> {
    let img = image::load_from_memory(cover)?;

    // Fit to the target width; the height bound is effectively unlimited
    let thumbnail = img.resize(settings.width, u32::MAX, FilterType::Lanczos3);

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, settings.quality);
    thumbnail.to_rgb8().write_with_encoder(encoder)?;
    Ok(jpeg)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
