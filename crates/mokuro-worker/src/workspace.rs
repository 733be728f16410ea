//! Per-job scratch workspace.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use mokuro_models::JobId;

use crate::error::WorkerResult;

/// A uniquely-named temporary directory owned by one job controller
/// invocation: `job_{jobId}_{timestamp}` under the configured temp
/// root, with an `extracted/` subtree.
///
/// Removal is best-effort and unconditional: call [`cleanup`] when
/// the invocation ends; `Drop` removes the tree as a backstop if an
/// exit path (including a panic) skipped it.
///
/// [`cleanup`]: Workspace::cleanup
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Allocate the workspace directories on disk.
    pub async fn create(temp_root: &Path, job_id: &JobId) -> WorkerResult<Self> {
        let root = temp_root.join(format!("job_{}_{}", job_id, Utc::now().timestamp()));
        tokio::fs::create_dir_all(root.join("extracted")).await?;

        debug!("Created workspace {}", root.display());
        Ok(Self {
            root,
            cleaned: false,
        })
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the archive is extracted into.
    pub fn extracted_dir(&self) -> PathBuf {
        self.root.join("extracted")
    }

    /// Remove the workspace tree. Failure is logged, never escalated.
    pub async fn cleanup(mut self) {
        self.cleaned = true;
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!("Cleaned up workspace {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clean up workspace {}: {}", self.root.display(), e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove workspace {}: {}", self.root.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cleanup_removes_tree() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path(), &JobId::from_string("j1"))
            .await
            .unwrap();
        let root = workspace.root().to_path_buf();

        std::fs::write(workspace.extracted_dir().join("001.jpg"), b"x").unwrap();
        assert!(root.exists());

        workspace.cleanup().await;
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn drop_removes_tree_when_cleanup_was_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let root = {
            let workspace = Workspace::create(temp.path(), &JobId::from_string("j2"))
                .await
                .unwrap();
            workspace.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn workspace_names_carry_the_job_id() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(temp.path(), &JobId::from_string("abc-123"))
            .await
            .unwrap();

        let name = workspace.root().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job_abc-123_"));
        workspace.cleanup().await;
    }
}
