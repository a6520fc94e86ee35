//! Three-way resolution rules for a single tracked path.
//!
//! Given the blob a path maps to in the merge base, in the current branch
//! head and in the target branch head, [`resolve_path`] decides what the
//! merged tree should contain. The rules favour whichever side changed the
//! path relative to the base; a path changed differently on both sides is a
//! conflict.

use crate::artifacts::objects::object_id::ObjectId;
use bytes::{BufMut, Bytes, BytesMut};

const CONFLICT_CURRENT_MARKER: &[u8] = b"<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &[u8] = b"=======\n";
const CONFLICT_TARGET_MARKER: &[u8] = b">>>>>>>\n";

/// Outcome of merging a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// The current branch version already is the merged result.
    KeepCurrent,
    /// The target branch version wins and is staged for addition.
    TakeTarget(ObjectId),
    /// The path is deleted from the workspace and staged for removal.
    Remove,
    /// Both sides changed the path in different ways.
    Conflict {
        current: Option<ObjectId>,
        target: Option<ObjectId>,
    },
}

/// Decides the merged state of a path from its three tree entries.
///
/// `None` means the path is absent from that tree.
pub fn resolve_path(
    base: Option<&ObjectId>,
    current: Option<&ObjectId>,
    target: Option<&ObjectId>,
) -> PathResolution {
    if current == target {
        // Includes both sides deleting, and both sides adding the same blob
        return PathResolution::KeepCurrent;
    }

    let changed_in_current = current != base;
    let changed_in_target = target != base;

    match (changed_in_current, changed_in_target) {
        (false, true) => match target {
            Some(target_id) => PathResolution::TakeTarget(target_id.clone()),
            None => PathResolution::Remove,
        },
        (true, false) => PathResolution::KeepCurrent,
        // current != target rules out (false, false) here
        _ => PathResolution::Conflict {
            current: current.cloned(),
            target: target.cloned(),
        },
    }
}

/// Builds the marker-delimited contents of a conflicted file.
///
/// A side that deleted the path contributes empty contents between its
/// markers.
pub fn conflict_file_contents(current: Option<&Bytes>, target: Option<&Bytes>) -> Bytes {
    let mut contents = BytesMut::new();
    contents.put_slice(CONFLICT_CURRENT_MARKER);
    if let Some(current) = current {
        contents.put_slice(current);
    }
    contents.put_slice(CONFLICT_SEPARATOR);
    if let Some(target) = target {
        contents.put_slice(target);
    }
    contents.put_slice(CONFLICT_TARGET_MARKER);
    contents.freeze()
}
