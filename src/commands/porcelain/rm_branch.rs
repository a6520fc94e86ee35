use crate::areas::repository::Repository;
use crate::artifacts::branch::BranchName;

impl Repository {
    /// Delete a branch pointer
    ///
    /// Only the pointer goes away; the commits it reached stay in the
    /// object store.
    pub fn rm_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
