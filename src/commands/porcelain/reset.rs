use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;

impl Repository {
    /// Move the current branch to an arbitrary commit and check it out
    ///
    /// With HEAD detached, HEAD itself moves instead.
    pub fn reset(&self, commit_id: &str) -> anyhow::Result<()> {
        let target_oid = self.resolve_commit_id(commit_id)?;

        self.checkout_commit(&target_oid)?;

        match self.refs().head_state()? {
            HeadState::Branch(name) => self.refs().advance_branch(&name, &target_oid)?,
            HeadState::Detached(_) => self.refs().set_head_detached(&target_oid)?,
        }

        Ok(())
    }
}
