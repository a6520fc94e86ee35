//! Commit object
//!
//! A commit is an immutable snapshot of the whole tracked tree: a mapping
//! from tracked path to blob identifier, plus parent linkage, a message and
//! a creation timestamp. The tree is kept flat (no nested tree objects);
//! the `BTreeMap` guarantees a canonical path-sorted serialization, so the
//! identifier depends only on the documented byte layout.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-id>          (zero, one, or two lines)
//! timestamp <unix-seconds>
//! tracked <blob-id> <path>    (sorted by path)
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Mapping from tracked path to blob identifier
pub type Tree = BTreeMap<PathBuf, ObjectId>;

/// Message of the commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Slim representation of a commit
///
/// Only what the merge-base search needs: identity, parent edges and the
/// timestamp used to order the traversal.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Snapshot of the tracked tree plus metadata
///
/// Immutable once created, never deleted. Zero parents only for the root
/// commit, two only for a merge.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs, first parent first
    parents: Vec<ObjectId>,
    /// Tracked path to blob identifier
    tree: Tree,
    /// Commit message
    message: String,
    /// Creation time; fixed at the epoch for the root commit
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree: Tree,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Commit {
            parents,
            tree,
            message,
            timestamp,
        }
    }

    /// The commit every repository starts from
    ///
    /// Uses a fixed epoch timestamp so repeated `init` calls produce the
    /// same identifier.
    pub fn root() -> Self {
        Commit {
            parents: Vec::new(),
            tree: Tree::new(),
            message: ROOT_COMMIT_MESSAGE.to_string(),
            timestamp: chrono::DateTime::UNIX_EPOCH,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the one history walks follow
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn blob_id_for(&self, path: &Path) -> Option<&ObjectId> {
        self.tree.get(path)
    }

    /// Timestamp in the human-readable log form
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y +0000")
            .to_string()
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!("timestamp {}", self.timestamp.timestamp()));
        for (path, blob_id) in &self.tree {
            let path = path
                .to_str()
                .with_context(|| format!("Non UTF-8 tracked path: {path:?}"))?;
            object_content.push(format!("tracked {} {}", blob_id.as_ref(), path));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        let mut content_bytes = Vec::new();
        content_bytes.write_all(object_content.as_bytes())?;

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing timestamp line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing timestamp line")?;
        }

        let seconds = next_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?
            .parse::<i64>()
            .context("Invalid commit object: malformed timestamp")?;
        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .context("Invalid commit object: timestamp out of range")?;

        let mut tree = Tree::new();
        loop {
            let line = lines
                .next()
                .context("Invalid commit object: missing message separator")?;

            match line.strip_prefix("tracked ") {
                Some(entry) => {
                    let (blob_id, path) = entry
                        .split_once(' ')
                        .context("Invalid commit object: invalid tracked line")?;
                    tree.insert(
                        PathBuf::from(path),
                        ObjectId::try_parse(blob_id.to_string())?,
                    );
                }
                // blank separator line before the message
                None if line.is_empty() => break,
                None => anyhow::bail!("Invalid commit object: unexpected line {line:?}"),
            }
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parents, tree, message, timestamp))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
