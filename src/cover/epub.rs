//! E-book package cover lookup
//!
//! An EPUB points at its package document through `META-INF/container.xml`.
//! The package document names the cover either with
//! `<meta name="cover" content="ITEM-ID"/>` in its metadata (EPUB 2) or with
//! a manifest item carrying `properties="cover-image"` (EPUB 3).

use roxmltree::{Document, Node, ParsingOptions};

use super::{open_archive, read_entry};
use crate::error::{Error, Result};

/// Fixed location of the container descriptor
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// `META-INF/container.xml`, reduced to the one thing we need from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    /// `full-path` of the first `rootfile`
    pub rootfile_path: String,
}

/// A `<meta>` element from the package metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub name: Option<String>,
    pub content: Option<String>,
}

/// An `<item>` element from the package manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: Option<String>,
    pub href: String,
    pub properties: Option<String>,
}

/// The parts of the package document that matter for cover lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub metadata_metas: Vec<MetaEntry>,
    pub manifest_items: Vec<ManifestItem>,
}

/// Find the cover image inside an EPUB.
///
/// Returns `Ok(None)` when the package names no cover, or names one that is
/// not actually in the archive. Fails if the archive cannot be opened or the
/// container descriptor / package document is missing or unparsable.
pub fn locate_cover(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut archive = open_archive(bytes)?;

    let container_xml = read_entry(&mut archive, CONTAINER_PATH)?
        .ok_or_else(|| Error::ManifestMissing(CONTAINER_PATH.to_string()))?;
    let container = ContainerDescriptor::parse(&decode_text(&container_xml))?;

    let opf_path = container.rootfile_path;
    let opf_xml = read_entry(&mut archive, &opf_path)?.ok_or_else(|| Error::ManifestMissing(opf_path.clone()))?;
    let package = PackageDocument::parse(&opf_path, &decode_text(&opf_xml))?;

    let Some(item) = package.cover_item() else {
        tracing::debug!(package = %opf_path, "package declares no cover");
        return Ok(None);
    };

    let cover_path = resolve_href(&opf_path, &item.href);
    let cover = read_entry(&mut archive, &cover_path)?;
    if cover.is_none() {
        tracing::debug!(package = %opf_path, cover = %cover_path, "cover resource missing from archive");
    }
    Ok(cover)
}

impl ContainerDescriptor {
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = parse_xml(CONTAINER_PATH, xml)?;
        let rootfile = doc
            .descendants()
            .find(|n| n.has_tag_name("rootfile"))
            .ok_or_else(|| Error::invalid_manifest(CONTAINER_PATH, "no <rootfile> element"))?;
        let path = rootfile
            .attribute("full-path")
            .ok_or_else(|| Error::invalid_manifest(CONTAINER_PATH, "<rootfile> has no full-path"))?;

        Ok(ContainerDescriptor {
            rootfile_path: path.to_string(),
        })
    }
}

impl PackageDocument {
    /// Parse the package document. `entry` is only used in error messages.
    pub fn parse(entry: &str, xml: &str) -> Result<Self> {
        let doc = parse_xml(entry, xml)?;
        let root = doc.root_element();

        let metadata_metas = first_child(root, "metadata")
            .map(|metadata| {
                children_named(metadata, "meta")
                    .map(|meta| MetaEntry {
                        name: meta.attribute("name").map(str::to_string),
                        content: meta.attribute("content").map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let manifest_items = first_child(root, "manifest")
            .map(|manifest| {
                children_named(manifest, "item")
                    .filter_map(|item| {
                        Some(ManifestItem {
                            id: item.attribute("id").map(str::to_string),
                            href: item.attribute("href")?.to_string(),
                            properties: item.attribute("properties").map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(PackageDocument {
            metadata_metas,
            manifest_items,
        })
    }

    /// Manifest id named by the first `<meta name="cover">`
    pub fn cover_id(&self) -> Option<&str> {
        self.metadata_metas
            .iter()
            .find(|meta| meta.name.as_deref() == Some("cover"))
            .and_then(|meta| meta.content.as_deref())
    }

    /// The manifest item holding the cover.
    ///
    /// The `meta name="cover"` reference wins; if it is absent or dangling,
    /// the first item whose `properties` include `cover-image` is used.
    pub fn cover_item(&self) -> Option<&ManifestItem> {
        let by_meta = self.cover_id().and_then(|id| {
            self.manifest_items
                .iter()
                .find(|item| item.id.as_deref() == Some(id))
        });

        by_meta.or_else(|| {
            self.manifest_items.iter().find(|item| {
                item.properties
                    .as_deref()
                    .is_some_and(|props| props.split_whitespace().any(|p| p == "cover-image"))
            })
        })
    }
}

/// Resolve a manifest `href` against the package document's directory.
/// Backslashes become `/`, and `.` / `..` segments are folded away.
pub fn resolve_href(opf_path: &str, href: &str) -> String {
    let opf_path = opf_path.replace('\\', "/");
    let base = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

    let joined = if base.is_empty() {
        href.replace('\\', "/")
    } else {
        format!("{}/{}", base, href.replace('\\', "/"))
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn parse_xml<'a>(entry: &str, xml: &'a str) -> Result<Document<'a>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options).map_err(|e| Error::invalid_manifest(entry, e))
}

fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}
