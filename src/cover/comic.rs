//! Comic archive cover lookup: the first page image by entry name

use super::{open_archive, read_entry};
use crate::error::Result;

/// Entry suffixes treated as page images (compared lowercase)
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Return the bytes of the first page image of a `.cbz`/`.zip` archive.
///
/// Pages are ordered by plain byte-wise comparison of the entry names, so
/// `page10.jpg` comes before `page2.jpg`.
pub fn locate_cover(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut archive = open_archive(bytes)?;

    let first_page = archive
        .file_names()
        .filter(|name| is_page_image(name))
        .min()
        .map(str::to_string);

    match first_page {
        Some(name) => read_entry(&mut archive, &name),
        None => Ok(None),
    }
}

fn is_page_image(name: &str) -> bool {
    if name.ends_with('/') {
        return false;
    }
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
