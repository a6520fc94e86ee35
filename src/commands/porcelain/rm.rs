use crate::areas::repository::Repository;
use crate::errors::RepoError;
use std::path::Path;

impl Repository {
    /// Unstage a file and, if the head commit tracks it, stage it for
    /// removal and delete it from the working directory
    pub fn rm(&self, path: &Path) -> anyhow::Result<()> {
        let mut stage = self.stage();
        stage.rehydrate()?;

        let head_commit = self.head_commit()?;
        let tracked_blob_id = head_commit.blob_id_for(path).cloned();
        let staged_for_addition = stage.is_staged_for_addition(path);

        if !staged_for_addition && tracked_blob_id.is_none() {
            return Err(RepoError::NoReasonToRemove(path.to_path_buf()).into());
        }

        if staged_for_addition {
            stage.unstage(path);
        }

        if let Some(blob_id) = tracked_blob_id {
            stage.stage_remove(path.to_path_buf(), blob_id);
            self.workspace().delete_file(path)?;
        }

        stage.write_updates()?;

        Ok(())
    }
}
