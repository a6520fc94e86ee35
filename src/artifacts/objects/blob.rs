//! Blob object
//!
//! A blob is an immutable snapshot of one file at add-time: its name and its
//! byte content. The name participates in the identifier, so the same bytes
//! under two different names are two distinct blobs.
//!
//! ## Format
//!
//! On disk: `blob <size>\0name <file-name>\n<content bytes>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// File snapshot stored in the object database
///
/// Never mutated after creation; a changed file produces a new blob with a
/// different identifier.
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct Blob {
    /// Tracked path of the file at add-time
    name: String,
    /// Raw file content
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        writeln!(content_bytes, "name {}", self.name)?;
        content_bytes.write_all(&self.content)?;

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut name_line = String::new();
        reader.read_line(&mut name_line)?;
        let name = name_line
            .strip_prefix("name ")
            .context("Invalid blob object: missing name line")?
            .trim_end_matches('\n')
            .to_string();

        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        Ok(Self::new(name, content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn identical_name_and_content_produce_identical_ids() {
        let first = Blob::new("notes.txt".to_string(), Bytes::from_static(b"hello"));
        let second = Blob::new("notes.txt".to_string(), Bytes::from_static(b"hello"));

        assert_eq!(
            first.object_id().unwrap(),
            second.object_id().unwrap(),
            "content addressing must be deterministic"
        );
    }

    #[test]
    fn changing_one_byte_changes_the_id() {
        let first = Blob::new("notes.txt".to_string(), Bytes::from_static(b"hello"));
        let second = Blob::new("notes.txt".to_string(), Bytes::from_static(b"hellp"));

        assert_ne!(first.object_id().unwrap(), second.object_id().unwrap());
    }

    #[test]
    fn same_content_under_different_names_are_distinct_blobs() {
        let first = Blob::new("a.txt".to_string(), Bytes::from_static(b"same"));
        let second = Blob::new("b.txt".to_string(), Bytes::from_static(b"same"));

        assert_ne!(first.object_id().unwrap(), second.object_id().unwrap());
    }

    #[test]
    fn serialization_round_trips() {
        let blob = Blob::new("dir/file.txt".to_string(), Bytes::from_static(b"payload\nbytes"));
        let serialized = blob.serialize().unwrap();

        let mut reader = Cursor::new(serialized);
        crate::artifacts::objects::object_type::ObjectType::parse_object_type(&mut reader).unwrap();
        let parsed = Blob::deserialize(reader).unwrap();

        assert_eq!(parsed, blob);
    }
}
