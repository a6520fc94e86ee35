use crate::areas::repository::Repository;
use crate::artifacts::branch::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::path::Path;

impl Repository {
    /// Switch the working directory and HEAD to another branch
    pub fn checkout_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(RepoError::BranchNotFound(branch_name.to_string()).into());
        }
        if self.refs().current_branch_name()?.as_ref() == Some(&branch_name) {
            return Err(RepoError::AlreadyOnBranch(branch_name.to_string()).into());
        }

        let target_oid = self.refs().read_branch(&branch_name)?;
        self.checkout_commit(&target_oid)?;
        self.refs().set_head_to_branch(&branch_name)?;

        Ok(())
    }

    /// Restore a single file to its head-commit version
    pub fn checkout_file_from_head(&self, path: &Path) -> anyhow::Result<()> {
        let head_oid = self.refs().resolve_head()?;
        self.checkout_file_from_commit(head_oid.as_ref(), path)
    }

    /// Restore a single file to its version in the given commit
    ///
    /// The restored version is not staged. Abbreviated commit ids are
    /// resolved against the object store.
    pub fn checkout_file_from_commit(&self, commit_id: &str, path: &Path) -> anyhow::Result<()> {
        let commit_oid = self.resolve_commit_id(commit_id)?;
        let commit = self.database().load_commit(&commit_oid)?;

        let blob_id = commit
            .blob_id_for(path)
            .ok_or_else(|| RepoError::FileNotInCommit(path.to_path_buf()))?;
        let blob = self
            .database()
            .parse_object_as_blob(blob_id)?
            .ok_or_else(|| RepoError::NotFound(blob_id.clone()))?;

        self.workspace().write_file(path, blob.content())?;

        Ok(())
    }

    /// Materialize a commit's tree in the working directory and clear the
    /// stage
    ///
    /// Shared by branch checkout and reset. The untracked-file guard runs
    /// over the whole target tree before anything is written.
    pub(crate) fn checkout_commit(&self, target_oid: &ObjectId) -> anyhow::Result<()> {
        let current_tree = self.head_commit()?.into_tree();
        let target_tree = self.database().load_commit(target_oid)?.into_tree();

        Migration::new(self, current_tree, target_tree).apply_changes()
    }
}
