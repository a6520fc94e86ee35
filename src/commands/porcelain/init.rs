use crate::areas::repository::Repository;
use crate::artifacts::branch::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepoError;
use anyhow::Context;
use std::fs;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    /// Create the repository layout and the shared root commit
    ///
    /// The root commit has a fixed timestamp, so every repository starts
    /// from the same commit id and branches created before any real commit
    /// all point at it.
    pub fn init(&self) -> anyhow::Result<()> {
        if self.repo_path().exists() {
            return Err(RepoError::RepositoryExists.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("failed to create the objects directory")?;
        fs::create_dir_all(self.refs().heads_path())
            .context("failed to create the refs/heads directory")?;

        let root_commit_id = self.database().store(Commit::root())?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs().create_branch(&default_branch, &root_commit_id)?;
        self.refs().set_head_to_branch(&default_branch)?;

        self.stage().write_updates()?;

        Ok(())
    }
}
