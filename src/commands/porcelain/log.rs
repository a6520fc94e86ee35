use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Walk the first-parent chain from HEAD and display each commit
    ///
    /// Second parents of merge commits are noted but not followed.
    pub fn log(&self) -> anyhow::Result<()> {
        let mut current_oid = Some(self.refs().resolve_head()?);

        while let Some(commit_oid) = current_oid {
            let commit = self.database().load_commit(&commit_oid)?;

            self.display_commit(&commit_oid, &commit)?;

            current_oid = commit.parent().cloned();
        }

        Ok(())
    }

    pub(crate) fn display_commit(&self, oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "===")?;
        writeln!(self.writer(), "commit {}", oid)?;
        if let [first_parent, second_parent] = commit.parents() {
            writeln!(
                self.writer(),
                "Merge: {} {}",
                first_parent.to_short_oid(),
                second_parent.to_short_oid()
            )?;
        }
        writeln!(self.writer(), "Date: {}", commit.readable_timestamp())?;
        writeln!(self.writer(), "{}", commit.message())?;
        writeln!(self.writer())?;

        Ok(())
    }
}
