//! Library refresh orchestration
//!
//! `Indexer` is what the host holds on to. Each `refresh()` rebuilds the
//! whole tree from disk, rewrites the data artifact and leaves the previews
//! cache in place for the next run. Only one refresh runs at a time; a
//! second request while one is in flight is turned away.

use serde::Serialize;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::LibraryConfig;
use crate::error::{Error, Result};
use crate::library::{artifact, LibraryNode, ScanStats, Scanner};

/// Summary of a finished refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// `false` when there was no `Library` folder and an empty tree was written
    pub library_present: bool,
    pub files: usize,
    pub folders: usize,
    pub scan: ScanStats,
    /// Files in the previews directory after the run
    pub preview_count: usize,
}

/// What the host hands back to whoever asked for the refresh
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Indexer {
    config: Arc<LibraryConfig>,
    /// Held for the duration of a refresh
    busy: Mutex<()>,
}

impl Indexer {
    pub fn new(config: LibraryConfig) -> Self {
        Indexer {
            config: Arc::new(config),
            busy: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Rebuild the library tree and rewrite the data artifact.
    ///
    /// Per-file cover problems never fail the refresh. Failing to read the
    /// library folder or to write the artifact does.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let _guard = self.busy.try_lock().map_err(|_| Error::RefreshInProgress)?;
        let config = &self.config;

        tracing::info!(
            library = %config.library_root.display(),
            previews = %config.previews_dir.display(),
            output = %config.output_path.display(),
            "🔍 Scanning library"
        );

        tokio::fs::create_dir_all(&config.previews_dir)
            .await
            .map_err(|source| Error::OutputWrite {
                path: config.previews_dir.clone(),
                source,
            })?;

        if !library_exists(&config.library_root).await? {
            write_artifact(&config.output_path, artifact::EMPTY_ARTIFACT).await?;
            tracing::info!("Library folder not found. Wrote an empty library.");
            return Ok(RefreshReport {
                preview_count: count_previews(&config.previews_dir).await,
                ..RefreshReport::default()
            });
        }

        let scan_config = Arc::clone(config);
        let (tree, scan) = tokio::task::spawn_blocking(move || {
            let mut scanner = Scanner::new(&scan_config);
            let tree = scanner.scan(&scan_config.library_root)?;
            Ok::<_, Error>((tree, scanner.stats()))
        })
        .await??;

        let (files, folders) = tree.count();
        let text = artifact::render(&LibraryNode::Folder(tree))?;
        write_artifact(&config.output_path, &text).await?;

        let report = RefreshReport {
            library_present: true,
            files,
            folders,
            scan,
            preview_count: count_previews(&config.previews_dir).await,
        };

        tracing::info!(
            files = report.files,
            folders = report.folders,
            generated = report.scan.generated,
            failed = report.scan.failed,
            previews = report.preview_count,
            "✅ Library refresh complete"
        );
        Ok(report)
    }

    /// Run a refresh and shape the outcome for the host
    pub async fn handle_refresh(&self) -> RefreshResponse {
        match self.refresh().await {
            Ok(_) => RefreshResponse {
                success: true,
                message: "Library refreshed successfully.".to_string(),
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "library refresh failed");
                RefreshResponse {
                    success: false,
                    message: "Failed to generate library.".to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// `Ok(false)` only when the folder is genuinely absent
async fn library_exists(root: &Path) -> Result<bool> {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => Err(Error::LibraryRead {
            path: root.to_path_buf(),
            source: io::Error::other("library path is not a directory"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(Error::LibraryRead {
            path: root.to_path_buf(),
            source,
        }),
    }
}

async fn write_artifact(path: &Path, text: &str) -> Result<()> {
    tokio::fs::write(path, text)
        .await
        .map_err(|source| Error::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
}

async fn count_previews(dir: &Path) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "could not count previews");
            return 0;
        }
    };

    let mut count = 0;
    loop {
        match entries.next_entry().await {
            Ok(Some(_)) => count += 1,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, counted = count, "preview count cut short");
                break;
            }
        }
    }
    count
}
