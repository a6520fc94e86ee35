use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use chrono::Utc;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RepoError::EmptyCommitMessage.into());
        }

        {
            let mut stage = self.stage();
            stage.rehydrate()?;

            if stage.is_empty() {
                return Err(RepoError::NothingToCommit.into());
            }
        }

        let head_oid = self.refs().resolve_head()?;
        self.commit_with_parents(vec![head_oid], message)?;

        Ok(())
    }

    /// Turn the staged changes into a commit on top of the given parents
    ///
    /// The new tree is the head tree with the staged additions applied and
    /// the staged removal paths dropped. An empty stage still commits; merge
    /// commits record both parents even when the trees agree, so rejecting
    /// empty stages is the single-parent caller's job. The stage is cleared
    /// only after the commit object is durably stored and the current ref
    /// advanced.
    pub(crate) fn commit_with_parents(
        &self,
        parents: Vec<ObjectId>,
        message: &str,
    ) -> anyhow::Result<ObjectId> {
        let mut stage = self.stage();
        stage.rehydrate()?;

        let mut tree = self.head_commit()?.into_tree();
        for (path, blob_id) in stage.additions() {
            tree.insert(path.clone(), blob_id.clone());
        }
        for path in stage.removals().keys() {
            tree.remove(path);
        }

        let commit = Commit::new(parents, tree, message.to_string(), Utc::now());
        let commit_id = self.database().store(commit)?;

        match self.refs().head_state()? {
            HeadState::Branch(name) => self.refs().advance_branch(&name, &commit_id)?,
            HeadState::Detached(_) => self.refs().set_head_detached(&commit_id)?,
        }

        stage.clear();
        stage.write_updates()?;

        Ok(commit_id)
    }
}
