//! Cover extraction from library containers
//!
//! This module handles:
//! - Picking a locator from the file extension (`ContainerKind`)
//! - Finding the cover of an e-book package (epub.rs)
//! - Finding the first page of a comic archive (comic.rs)
//!
//! Locators take the raw container bytes and hand back the raw cover image
//! bytes, or `None` when the container simply has no cover.

pub mod comic;
pub mod epub;

use std::io::{Cursor, Read};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Container formats we know how to pull a cover out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `.epub` e-book package
    Package,
    /// `.cbz` / `.zip` comic archive
    Comic,
}

impl ContainerKind {
    /// Pick the container kind from a file extension (case-insensitive).
    /// Anything other than `epub`, `cbz` or `zip` gets no cover attempt.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "epub" => Some(ContainerKind::Package),
            "cbz" | "zip" => Some(ContainerKind::Comic),
            _ => None,
        }
    }

    /// Run the matching locator over the container bytes
    pub fn locate_cover(self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        match self {
            ContainerKind::Package => epub::locate_cover(bytes),
            ContainerKind::Comic => comic::locate_cover(bytes),
        }
    }
}

pub(crate) type MemoryArchive<'a> = ZipArchive<Cursor<&'a [u8]>>;

pub(crate) fn open_archive(bytes: &[u8]) -> Result<MemoryArchive<'_>> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Read an archive entry in full. A missing entry is `Ok(None)`.
pub(crate) fn read_entry(archive: &mut MemoryArchive<'_>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::ContainerCorrupt(e)),
    };

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| Error::ContainerCorrupt(ZipError::Io(e)))?;
    Ok(Some(data))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use image::{ImageFormat, Rgb, RgbImage};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory zip from `(name, bytes)` pairs.
    /// Names ending in `/` become directory entries.
    pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    /// A small solid-colour PNG
    pub fn png_bytes(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([shade, 255 - shade, 64]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    /// An EPUB with the package document at `OEBPS/content.opf`
    pub fn epub_bytes(opf: &str, resources: &[(&str, &[u8])]) -> Vec<u8> {
        let mut entries: Vec<(&str, &[u8])> = vec![
            ("mimetype", b"application/epub+zip".as_slice()),
            ("META-INF/container.xml", CONTAINER_XML.as_bytes()),
            ("OEBPS/content.opf", opf.as_bytes()),
        ];
        entries.extend_from_slice(resources);
        zip_bytes(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ContainerKind::from_path(Path::new("a/Book.epub")), Some(ContainerKind::Package));
        assert_eq!(ContainerKind::from_path(Path::new("Book.EPUB")), Some(ContainerKind::Package));
        assert_eq!(ContainerKind::from_path(Path::new("Comic.cbz")), Some(ContainerKind::Comic));
        assert_eq!(ContainerKind::from_path(Path::new("Comic.Zip")), Some(ContainerKind::Comic));
        assert_eq!(ContainerKind::from_path(Path::new("notes.pdf")), None);
        assert_eq!(ContainerKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_read_entry_missing_is_none() {
        let bytes = fixtures::zip_bytes(&[("a.txt", b"hello")]);
        let mut archive = open_archive(&bytes).unwrap();
        assert_eq!(read_entry(&mut archive, "a.txt").unwrap().as_deref(), Some(&b"hello"[..]));
        assert!(read_entry(&mut archive, "b.txt").unwrap().is_none());
    }

    #[test]
    fn test_open_garbage_is_corrupt() {
        let result = open_archive(b"definitely not a zip file");
        assert!(matches!(result, Err(Error::ContainerCorrupt(_))));
    }
}
