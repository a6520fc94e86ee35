//! Working-directory migration between commits
//!
//! Materializing a target tree happens in two phases:
//!
//! 1. **Plan**: diff the current tree against the target tree into
//!    Add/Modify/Delete action sets, and scan the *entire* target tree for
//!    untracked files that would be overwritten.
//! 2. **Apply**: only when the plan is conflict-free, rewrite the workspace
//!    and clear the staging area.
//!
//! The conflict scan runs to completion before the first destructive write;
//! silently overwriting a file the repository does not track is the failure
//! mode this protocol exists to prevent.

use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Tree;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Type of file system action required for checkout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Overwrite existing file
    Modify,
}

/// Set of planned actions grouped by type
pub type ActionsSet = HashMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>;

/// Migration planner and executor
///
/// Plans and executes the switch from the current commit's tree to a target
/// tree. Conflicts are detected before any change is made.
pub struct Migration<'r> {
    repository: &'r Repository,
    current_tree: Tree,
    target_tree: Tree,
    actions: ActionsSet,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, current_tree: Tree, target_tree: Tree) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            repository,
            current_tree,
            target_tree,
            actions,
        }
    }

    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.update_workspace()?;
        self.update_stage()?;

        Ok(())
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        untracked_conflicts_guard(
            self.repository,
            &self.current_tree,
            self.target_tree.keys().map(PathBuf::as_path),
        )?;

        for (path, target_id) in &self.target_tree {
            match self.current_tree.get(path) {
                None => self
                    .actions
                    .entry(ActionType::Add)
                    .or_default()
                    .push((path.clone(), Some(target_id.clone()))),
                Some(current_id) if current_id != target_id => self
                    .actions
                    .entry(ActionType::Modify)
                    .or_default()
                    .push((path.clone(), Some(target_id.clone()))),
                // tracked with identical content, nothing to do
                Some(_) => {}
            }
        }

        for path in self.current_tree.keys() {
            if !self.target_tree.contains_key(path) {
                self.actions
                    .entry(ActionType::Delete)
                    .or_default()
                    .push((path.clone(), None));
            }
        }

        Ok(())
    }

    // deletions first so a path can move between file and directory shapes
    fn update_workspace(&self) -> anyhow::Result<()> {
        self.apply_action_set(ActionType::Delete)?;
        self.apply_action_set(ActionType::Modify)?;
        self.apply_action_set(ActionType::Add)?;

        Ok(())
    }

    fn apply_action_set(&self, action: ActionType) -> anyhow::Result<()> {
        let actions = self
            .actions
            .get(&action)
            .ok_or_else(|| anyhow::anyhow!("Invalid action type"))?;

        for (file_path, blob_id) in actions {
            match (&action, blob_id) {
                (ActionType::Delete, None) => {
                    self.repository.workspace().delete_file(file_path)?;
                }
                (ActionType::Add | ActionType::Modify, Some(blob_id)) => {
                    let data = self.load_blob_data(blob_id)?;
                    self.repository.workspace().write_file(file_path, &data)?;
                }
                _ => anyhow::bail!("Invalid action and entry combination"),
            }
        }

        Ok(())
    }

    fn update_stage(&self) -> anyhow::Result<()> {
        let mut stage = self.repository.stage();
        stage.clear();
        stage.write_updates()
    }

    fn load_blob_data(&self, object_id: &ObjectId) -> anyhow::Result<bytes::Bytes> {
        let blob = self
            .repository
            .database()
            .parse_object_as_blob(object_id)?
            .with_context(|| format!("Failed to parse blob object {}", object_id))?;

        Ok(blob.content().clone())
    }
}

/// Fail with `UntrackedFileConflict` if any of the paths about to be written
/// exists in the working directory without being tracked by the current tree
///
/// Scans every candidate path before returning, so a caller aborting on the
/// error is guaranteed to have mutated nothing.
pub fn untracked_conflicts_guard<'p>(
    repository: &Repository,
    current_tree: &Tree,
    candidate_paths: impl Iterator<Item = &'p Path>,
) -> anyhow::Result<()> {
    let mut conflicts = Vec::new();

    for path in candidate_paths {
        if !current_tree.contains_key(path) && repository.workspace().file_exists(path) {
            conflicts.push(path.to_path_buf());
        }
    }

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(RepoError::UntrackedFileConflict.into())
    }
}
