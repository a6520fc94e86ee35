//! Typed repository failures
//!
//! Every failing core operation surfaces one of these variants inside
//! `anyhow::Error`; the CLI layer downcasts to render the canonical message
//! and choose an exit code. The `Display` strings are part of the command
//! surface and must not be reworded.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("object {0} not found in the object store")]
    NotFound(ObjectId),

    #[error("object {id} is corrupt: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    #[error("Please enter a commit message.")]
    EmptyCommitMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict,

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("A branch with that name does not exist.")]
    BranchNotFound(String),

    #[error("Cannot remove the current branch.")]
    CannotRemoveActiveBranch(String),

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch(String),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    #[error("File does not exist.")]
    FileNotFound(PathBuf),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(PathBuf),

    #[error("No reason to remove the file.")]
    NoReasonToRemove(PathBuf),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    #[error("A lit version-control system already exists in the current directory.")]
    RepositoryExists,
}
