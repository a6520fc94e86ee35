use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Display branches and the pending stage contents
    ///
    /// Branch and file listings are name-sorted; the active branch is
    /// starred. A detached HEAD stars nothing.
    pub fn status(&self) -> anyhow::Result<()> {
        let mut stage = self.stage();
        stage.rehydrate()?;

        let current_branch = self.refs().current_branch_name()?;
        let mut branches = self.refs().list_branches()?;
        branches.sort();

        writeln!(self.writer(), "=== Branches ===")?;
        for branch in branches {
            if Some(&branch) == current_branch.as_ref() {
                writeln!(self.writer(), "{}", format!("*{}", branch).green())?;
            } else {
                writeln!(self.writer(), "{}", branch)?;
            }
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Staged Files ===")?;
        for path in stage.additions().keys() {
            writeln!(self.writer(), "{}", path.display())?;
        }
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Removed Files ===")?;
        for path in stage.removals().keys() {
            writeln!(self.writer(), "{}", path.display())?;
        }
        writeln!(self.writer())?;

        // worktree inspection is not tracked, so these stay empty
        writeln!(self.writer(), "=== Modifications Not Staged For Commit ===")?;
        writeln!(self.writer())?;

        writeln!(self.writer(), "=== Untracked Files ===")?;
        writeln!(self.writer())?;

        Ok(())
    }
}
