use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::errors::RepoError;
use std::path::Path;

impl Repository {
    /// Snapshot a file into the object store and stage it for the next
    /// commit
    ///
    /// Staging is idempotent: a file identical to its head-commit version
    /// is not staged, and any stale pending change for it is dropped.
    pub fn add(&self, path: &Path) -> anyhow::Result<()> {
        let mut stage = self.stage();
        stage.rehydrate()?;

        if !self.workspace().file_exists(path) {
            return Err(RepoError::FileNotFound(path.to_path_buf()).into());
        }

        let content = self.workspace().read_file(path)?;
        let blob = Blob::new(path.to_string_lossy().to_string(), content);
        let blob_id = blob.object_id()?;

        let head_commit = self.head_commit()?;
        if head_commit.blob_id_for(path) == Some(&blob_id) {
            stage.discard(path);
        } else {
            self.database().store(blob)?;
            stage.stage_add(path.to_path_buf(), blob_id);
        }

        stage.write_updates()?;

        Ok(())
    }
}
