use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::branch::BranchName;
use crate::artifacts::checkout::migration::untracked_conflicts_guard;
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::merge::resolution::{
    PathResolution, conflict_file_contents, resolve_path,
};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Merge another branch into the current one
    ///
    /// The merge base is the best common ancestor of the two branch tips.
    /// Two degenerate shapes short-circuit without a merge commit: a target
    /// that is already an ancestor of HEAD, and a HEAD that is an ancestor
    /// of the target (fast-forward). Everything else is a three-way merge;
    /// conflicting paths are written with conflict markers and staged, and
    /// the two-parent merge commit completes regardless.
    pub fn merge(&self, branch_name: &str) -> anyhow::Result<()> {
        {
            let mut stage = self.stage();
            stage.rehydrate()?;
            if !stage.is_empty() {
                return Err(RepoError::UncommittedChanges.into());
            }
        }

        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let target_oid = self.refs().read_branch(&branch_name)?;

        let current_branch = self.refs().current_branch_name()?;
        if current_branch.as_ref() == Some(&branch_name) {
            return Err(RepoError::SelfMerge.into());
        }

        let head_oid = self.refs().resolve_head()?;

        let base_oid = {
            let database = self.database();
            let finder = BCAFinder::new(|oid: &ObjectId| {
                database
                    .load_commit(oid)
                    .map(|commit| commit.to_slim(oid.clone()))
                    .expect("Failed to load commit")
            });
            finder
                .find_best_common_ancestor(&head_oid, &target_oid)
                .ok_or_else(|| {
                    anyhow::anyhow!("no common ancestor found between HEAD and target")
                })?
        };

        if base_oid == target_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(());
        }

        if base_oid == head_oid {
            return self.fast_forward(&target_oid);
        }

        let base_tree = self.database().load_commit(&base_oid)?.into_tree();
        let current_tree = self.database().load_commit(&head_oid)?.into_tree();
        let target_tree = self.database().load_commit(&target_oid)?.into_tree();

        let all_paths = base_tree
            .keys()
            .chain(current_tree.keys())
            .chain(target_tree.keys())
            .collect::<BTreeSet<_>>();

        let resolutions = all_paths
            .into_iter()
            .map(|path| {
                let resolution = resolve_path(
                    base_tree.get(path),
                    current_tree.get(path),
                    target_tree.get(path),
                );
                (path.clone(), resolution)
            })
            .collect::<Vec<_>>();

        // Guard every path the merge would write before writing any of them
        untracked_conflicts_guard(
            self,
            &current_tree,
            resolutions
                .iter()
                .filter(|(_, resolution)| {
                    matches!(
                        resolution,
                        PathResolution::TakeTarget(_) | PathResolution::Conflict { .. }
                    )
                })
                .map(|(path, _)| path.as_path()),
        )?;

        let mut conflicted = false;
        {
            let mut stage = self.stage();

            for (path, resolution) in resolutions {
                match resolution {
                    PathResolution::KeepCurrent => {}
                    PathResolution::TakeTarget(blob_id) => {
                        let content = self.blob_contents(&blob_id)?;
                        self.workspace().write_file(&path, &content)?;
                        stage.stage_add(path, blob_id);
                    }
                    PathResolution::Remove => {
                        self.workspace().delete_file(&path)?;
                        if let Some(blob_id) = current_tree.get(&path) {
                            stage.stage_remove(path, blob_id.clone());
                        }
                    }
                    PathResolution::Conflict { current, target } => {
                        conflicted = true;
                        self.write_conflict_file(&path, current.as_ref(), target.as_ref())?;
                        let merged_content = self.workspace().read_file(&path)?;
                        let blob =
                            Blob::new(path.to_string_lossy().to_string(), merged_content);
                        let blob_id = self.database().store(blob)?;
                        stage.stage_add(path, blob_id);
                    }
                }
            }

            stage.write_updates()?;
        }

        let message = format!(
            "Merged {} into {}.",
            branch_name,
            current_branch
                .as_ref()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "HEAD".to_string())
        );
        self.commit_with_parents(vec![head_oid, target_oid], &message)?;

        if conflicted {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(())
    }

    /// HEAD is the merge base, so the branch pointer just advances
    fn fast_forward(&self, target_oid: &ObjectId) -> anyhow::Result<()> {
        self.checkout_commit(target_oid)?;

        match self.refs().head_state()? {
            HeadState::Branch(name) => self.refs().advance_branch(&name, target_oid)?,
            HeadState::Detached(_) => self.refs().set_head_detached(target_oid)?,
        }

        writeln!(self.writer(), "Current branch fast-forwarded.")?;

        Ok(())
    }

    fn write_conflict_file(
        &self,
        path: &Path,
        current: Option<&ObjectId>,
        target: Option<&ObjectId>,
    ) -> anyhow::Result<()> {
        let current_content = current
            .map(|blob_id| self.blob_contents(blob_id))
            .transpose()?;
        let target_content = target
            .map(|blob_id| self.blob_contents(blob_id))
            .transpose()?;

        let contents = conflict_file_contents(current_content.as_ref(), target_content.as_ref());
        self.workspace().write_file(path, &contents)?;

        Ok(())
    }

    fn blob_contents(&self, blob_id: &ObjectId) -> anyhow::Result<Bytes> {
        let blob = self
            .database()
            .parse_object_as_blob(blob_id)?
            .ok_or_else(|| RepoError::NotFound(blob_id.clone()))?;

        Ok(blob.content().clone())
    }
}
