use crate::areas::repository::Repository;

impl Repository {
    /// Display every commit in the object store, in no particular order
    ///
    /// Blob objects found during the scan are skipped.
    pub fn global_log(&self) -> anyhow::Result<()> {
        for oid in self.database().list_object_ids()? {
            if let Some(commit) = self.database().parse_object_as_commit(&oid)? {
                self.display_commit(&oid, &commit)?;
            }
        }

        Ok(())
    }
}
