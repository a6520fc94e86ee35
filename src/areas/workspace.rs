//! Working-directory file operations
//!
//! All reads and writes of tracked files go through here; paths are always
//! relative to the workspace root. Deleting a file also prunes any now-empty
//! parent directories, so the workspace never accumulates husks of removed
//! trees.

use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_path);

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Unable to read file {}", file_path.display()))?;

        Ok(content.into())
    }

    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let absolute_path = self.path.join(file_path);

        if let Some(parent) = absolute_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create parent directory for {:?}", file_path)
            })?;
        }

        std::fs::write(&absolute_path, content)
            .with_context(|| format!("Unable to write file {}", absolute_path.display()))?;

        Ok(())
    }

    pub fn delete_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let absolute_path = self.path.join(file_path);

        if absolute_path.exists() {
            std::fs::remove_file(&absolute_path)
                .with_context(|| format!("Unable to delete file {}", absolute_path.display()))?;
            self.prune_empty_parent_dirs(&absolute_path)?;
        }

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.exists()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Unable to remove empty directory {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
