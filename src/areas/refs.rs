//! Branches and HEAD
//!
//! Branches are named pointers to commit identifiers, one file per branch
//! under `refs/heads`. HEAD is the process-wide current pointer and is
//! either symbolic (`ref: refs/heads/<name>`, the normal state) or a raw
//! commit identifier (detached).

use crate::artifacts::branch::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

/// Current position of HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a branch; commits advance it
    Branch(BranchName),
    /// HEAD names a commit directly
    Detached(ObjectId),
}

/// Reference manager
///
/// Reads and writes branch files and HEAD under the repository root.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository root (the `.lit` directory)
    path: Box<Path>,
}

impl Refs {
    /// Parse the HEAD file into its symbolic or detached form
    pub fn head_state(&self) -> anyhow::Result<HeadState> {
        let content = std::fs::read_to_string(self.head_path())
            .context("failed to read HEAD; is this a repository?")?;
        let content = content.trim();

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(captures) => Ok(HeadState::Branch(BranchName::try_parse(
                captures[1].to_string(),
            )?)),
            None => Ok(HeadState::Detached(ObjectId::try_parse(
                content.to_string(),
            )?)),
        }
    }

    /// Commit identifier HEAD currently points at, through the branch
    /// indirection when attached
    pub fn resolve_head(&self) -> anyhow::Result<ObjectId> {
        match self.head_state()? {
            HeadState::Branch(name) => self.read_branch(&name),
            HeadState::Detached(oid) => Ok(oid),
        }
    }

    /// Name of the active branch, or None when HEAD is detached
    pub fn current_branch_name(&self) -> anyhow::Result<Option<BranchName>> {
        match self.head_state()? {
            HeadState::Branch(name) => Ok(Some(name)),
            HeadState::Detached(_) => Ok(None),
        }
    }

    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.heads_path().join(name.as_ref());

        if !branch_path.exists() {
            return Err(RepoError::BranchNotFound(name.to_string()).into());
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;

        ObjectId::try_parse(content.trim().to_string())
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.heads_path().join(name.as_ref()).exists()
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();

        if branch_path.exists() {
            return Err(RepoError::BranchExists(name.to_string()).into());
        }

        self.update_ref_file(branch_path, source_oid.as_ref().into())
    }

    /// Overwrite a branch's stored commit id (commit and reset)
    pub fn advance_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();
        self.update_ref_file(branch_path, oid.as_ref().into())
    }

    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        if self.current_branch_name()?.as_ref() == Some(name) {
            return Err(RepoError::CannotRemoveActiveBranch(name.to_string()).into());
        }

        let oid = self.read_branch(name)?;
        let branch_path = self.heads_path().join(name.as_ref());

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        Ok(oid)
    }

    pub fn set_head_to_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(self.head_path(), format!("ref: refs/heads/{}", name))
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.head_path(), oid.as_ref().into())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        Ok(WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(heads_path.as_ref()).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>())
    }

    /// Rewrite a ref file in place under an exclusive lock
    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    // hierarchical branch names leave empty directories behind on delete
    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join("HEAD").into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
