use crate::areas::repository::Repository;
use crate::errors::RepoError;
use std::io::Write;

impl Repository {
    /// Print the ids of every commit whose message matches exactly
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut found = false;

        for oid in self.database().list_object_ids()? {
            if let Some(commit) = self.database().parse_object_as_commit(&oid)?
                && commit.message() == message
            {
                writeln!(self.writer(), "{}", oid)?;
                found = true;
            }
        }

        if !found {
            return Err(RepoError::NoCommitWithMessage(message.to_string()).into());
        }

        Ok(())
    }
}
