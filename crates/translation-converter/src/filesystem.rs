//! Temporary artifacts for external tool invocations.
//!
//! Every artifact is owned by exactly one invocation and deleted when its
//! guard drops, on success and failure paths alike. Deletion failures are
//! swallowed: the file may never have been created.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Generate a process-unique name: `{stem}_{millis}_{token}`.
pub fn unique_name(stem: &str) -> String {
    format!(
        "{}_{}_{}",
        stem,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// A single temporary file, removed on drop.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Reserve a unique path in `dir` without creating the file. Used for
    /// paths a tool writes to.
    pub fn reserve(dir: &Path, stem: &str, extension: &str) -> Self {
        Self {
            path: dir.join(format!("{}.{}", unique_name(stem), extension)),
        }
    }

    /// Create a unique file in `dir` holding `data`.
    ///
    /// On write failure the guard is dropped before returning, so a
    /// partially written file is removed too.
    pub async fn create(
        dir: &Path,
        stem: &str,
        extension: &str,
        data: &[u8],
    ) -> std::io::Result<Self> {
        let artifact = Self::reserve(dir, stem, extension);
        tokio::fs::write(&artifact.path, data).await?;
        Ok(artifact)
    }

    /// Path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %self.path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

/// A group of temporary files sharing a unique name prefix, for tools that
/// choose their own output file names (pdftoppm appends `-N.ext`). Every
/// directory entry starting with the prefix is removed on drop.
#[derive(Debug)]
pub struct TempPrefix {
    dir: PathBuf,
    prefix: String,
}

impl TempPrefix {
    /// Reserve a unique prefix in `dir`.
    pub fn reserve(dir: &Path, stem: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: unique_name(stem),
        }
    }

    /// `dir/prefix`, the root path handed to the tool.
    pub fn root(&self) -> PathBuf {
        self.dir.join(&self.prefix)
    }

    /// Find the first entry with this prefix and the given extension.
    pub async fn find_output(&self, extension: &str) -> std::io::Result<Option<PathBuf>> {
        let suffix = format!(".{extension}");
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&self.prefix) && name.ends_with(&suffix) {
                return Ok(Some(entry.path()));
            }
        }

        Ok(None)
    }

    /// Remove every entry with this prefix. Errors are ignored.
    fn remove_all(&self) {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(&self.prefix) {
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    debug!(path = %entry.path().display(), error = %e, "Failed to remove temp output");
                }
            }
        }
    }
}

impl Drop for TempPrefix {
    fn drop(&mut self) {
        self.remove_all();
    }
}
