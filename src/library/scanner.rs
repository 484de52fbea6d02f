//! Recursive library walk
//!
//! Folders are visited depth-first, one entry at a time, in the order the
//! filesystem lists them. Every regular file gets a preview attempt; other
//! entry kinds (sockets, FIFOs, devices) are left out.

use std::io;
use std::path::Path;
use walkdir::WalkDir;

use super::node::{FileNode, FolderNode, LibraryNode};
use crate::config::LibraryConfig;
use crate::error::{Error, Result};
use crate::preview::{PreviewGenerator, PreviewResult};

/// Entries starting with this are never indexed
pub const HIDDEN_MARKER: char = '.';

/// Per-file preview outcomes gathered during one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub generated: usize,
    pub cached: usize,
    pub no_cover: usize,
    pub failed: usize,
    /// Entries that could not be read and were left out of the tree
    pub skipped: usize,
}

pub struct Scanner<'a> {
    config: &'a LibraryConfig,
    previews: PreviewGenerator<'a>,
    stats: ScanStats,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a LibraryConfig) -> Self {
        Scanner {
            config,
            previews: PreviewGenerator::new(config),
            stats: ScanStats::default(),
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Build the tree for `dir`.
    ///
    /// Fails only if `dir` itself cannot be listed. Anything unreadable
    /// further down is logged and left out.
    pub fn scan(&mut self, dir: &Path) -> Result<FolderNode> {
        let mut node = FolderNode::empty(entry_name(dir));

        for entry in list_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "⚠️  skipping unreadable entry");
                    self.stats.skipped += 1;
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            if name.starts_with(HIDDEN_MARKER) {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                match self.scan(path) {
                    Ok(folder) => node.items.push(LibraryNode::Folder(folder)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "⚠️  skipping unreadable folder");
                        self.stats.skipped += 1;
                    }
                }
            } else if entry.file_type().is_file() {
                let file = self.scan_file(path);
                node.items.push(LibraryNode::File(file));
            } else {
                tracing::warn!(path = %path.display(), "⚠️  skipping entry that is not a regular file");
                self.stats.skipped += 1;
            }
        }

        node.roll_up_previews();
        Ok(node)
    }

    fn scan_file(&mut self, path: &Path) -> FileNode {
        let result = self.previews.generate(path);
        match &result {
            PreviewResult::Generated(_) => self.stats.generated += 1,
            PreviewResult::Cached(_) => self.stats.cached += 1,
            PreviewResult::NoCover => self.stats.no_cover += 1,
            PreviewResult::Failed(_) => self.stats.failed += 1,
        }

        FileNode {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: self.config.relative_path(path),
            preview_image: result.into_reference(),
        }
    }
}

/// One level of `dir`, in listing order. Errors opening `dir` itself are
/// returned; errors on individual entries are passed through for the
/// caller to skip.
fn list_dir(dir: &Path) -> Result<Vec<walkdir::Result<walkdir::DirEntry>>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        match entry {
            Err(e) if e.depth() == 0 => {
                return Err(Error::LibraryRead {
                    path: dir.to_path_buf(),
                    source: io::Error::from(e),
                });
            }
            other => entries.push(other),
        }
    }
    Ok(entries)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::fixtures::{png_bytes, zip_bytes};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LibraryConfig) {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::from_base_dir(dir.path());
        fs::create_dir_all(&config.library_root).unwrap();
        fs::create_dir_all(&config.previews_dir).unwrap();
        (dir, config)
    }

    fn comic(path: &Path, shade: u8) {
        fs::write(path, zip_bytes(&[("001.png", png_bytes(20, 30, shade).as_slice())])).unwrap();
    }

    fn names(folder: &FolderNode) -> Vec<&str> {
        folder.items.iter().map(LibraryNode::name).collect()
    }

    #[test]
    fn test_hidden_entries_are_skipped() {
        let (_dir, config) = setup();
        fs::write(config.library_root.join(".DS_Store"), b"junk").unwrap();
        fs::create_dir_all(config.library_root.join(".git/objects")).unwrap();
        comic(&config.library_root.join(".hidden.cbz"), 1);
        fs::write(config.library_root.join("visible.txt"), b"text").unwrap();

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&config.library_root).unwrap();
        assert_eq!(names(&tree), vec!["visible"]);
        assert_eq!(scanner.stats().generated, 0);
        assert!(!config.previews_dir.join(".hidden.jpg").exists());
    }

    #[test]
    fn test_file_nodes() {
        let (_dir, config) = setup();
        let nested = config.library_root.join("Manga").join("Series A");
        fs::create_dir_all(&nested).unwrap();
        comic(&nested.join("Vol 1.cbz"), 50);
        fs::write(nested.join("readme.md"), b"# hi").unwrap();

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&config.library_root).unwrap();
        assert_eq!(tree.name, "Library");

        let LibraryNode::Folder(manga) = &tree.items[0] else { panic!("expected folder") };
        let LibraryNode::Folder(series) = &manga.items[0] else { panic!("expected folder") };
        let mut files: Vec<&FileNode> = series
            .items
            .iter()
            .filter_map(|n| match n {
                LibraryNode::File(f) => Some(f),
                _ => None,
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(files[0].name, "Vol 1");
        assert_eq!(files[0].path, "Library/Manga/Series A/Vol 1.cbz");
        assert_eq!(files[0].preview_image, "previews/Vol-1.jpg");
        assert_eq!(files[1].name, "readme");
        assert_eq!(files[1].path, "Library/Manga/Series A/readme.md");
        assert_eq!(files[1].preview_image, "");

        // Roll-up passes the series preview up one level at a time
        assert_eq!(series.previews, vec!["previews/Vol-1.jpg"]);
        assert_eq!(manga.previews, vec!["previews/Vol-1.jpg"]);
        assert_eq!(tree.previews, vec!["previews/Vol-1.jpg"]);
    }

    #[test]
    fn test_five_previews_roll_up_to_four_in_listing_order() {
        let (_dir, config) = setup();
        let folder = config.library_root.join("Run");
        fs::create_dir_all(&folder).unwrap();
        for i in 0..5u8 {
            comic(&folder.join(format!("issue{i}.cbz")), i * 40);
        }

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&folder).unwrap();
        let listed: Vec<String> = tree
            .items
            .iter()
            .map(|n| match n {
                LibraryNode::File(f) => f.preview_image.clone(),
                LibraryNode::Folder(_) => panic!("unexpected folder"),
            })
            .collect();

        assert_eq!(listed.len(), 5);
        assert_eq!(tree.previews, listed[..4].to_vec());
        assert_eq!(scanner.stats().generated, 5);
    }

    #[test]
    fn test_corrupt_file_does_not_stop_scan() {
        let (_dir, config) = setup();
        fs::write(config.library_root.join("empty.epub"), b"").unwrap();
        fs::write(config.library_root.join("cut.epub"), b"PK\x03\x04trunc").unwrap();
        comic(&config.library_root.join("good.cbz"), 120);

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&config.library_root).unwrap();
        assert_eq!(tree.items.len(), 3);

        for item in &tree.items {
            let LibraryNode::File(file) = item else { panic!("expected file") };
            match file.name.as_str() {
                "good" => assert_eq!(file.preview_image, "previews/good.jpg"),
                _ => assert_eq!(file.preview_image, ""),
            }
        }
        assert_eq!(scanner.stats().failed, 2);
        assert_eq!(scanner.stats().generated, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let (_dir, config) = setup();
        std::os::unix::fs::symlink("/nonexistent/target.epub", config.library_root.join("gone.epub")).unwrap();
        fs::write(config.library_root.join("ok.txt"), b"text").unwrap();

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&config.library_root).unwrap();
        assert_eq!(names(&tree), vec!["ok"]);
        assert_eq!(scanner.stats().skipped, 1);
        assert_eq!(scanner.stats().no_cover, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_socket_is_not_read_as_file() {
        let (_dir, config) = setup();
        let _listener = std::os::unix::net::UnixListener::bind(config.library_root.join("x.cbz")).unwrap();
        comic(&config.library_root.join("real.cbz"), 70);

        let mut scanner = Scanner::new(&config);
        let tree = scanner.scan(&config.library_root).unwrap();
        assert_eq!(names(&tree), vec!["real"]);
        assert_eq!(scanner.stats().skipped, 1);
        assert_eq!(scanner.stats().failed, 0);
        assert!(!config.previews_dir.join("x.jpg").exists());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let (_dir, config) = setup();
        let mut scanner = Scanner::new(&config);
        let result = scanner.scan(&config.base_dir.join("nope"));
        assert!(matches!(result, Err(Error::LibraryRead { .. })));
    }
}
