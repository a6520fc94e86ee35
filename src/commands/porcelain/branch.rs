use crate::areas::repository::Repository;
use crate::artifacts::branch::BranchName;

impl Repository {
    /// Create a branch pointing at the current head commit
    ///
    /// HEAD stays where it is; switching is checkout's job.
    pub fn branch(&self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let head_oid = self.refs().resolve_head()?;

        self.refs().create_branch(&branch_name, &head_oid)?;

        Ok(())
    }
}
