//! Content-addressed object store
//!
//! Maps immutable byte payloads to SHA-1 derived identifiers under
//! `objects/<id>`, one flat file per identifier. Payloads are zlib-compressed
//! on disk and written through a temp-file rename, so an entry is either
//! absent or complete. An existing entry is never rewritten: `put` is
//! idempotent and content under a given identifier is immutable.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectKind, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepoError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use sha1::{Digest, Sha1};
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store a serialized payload under its content-derived identifier
    ///
    /// Writing identical bytes twice yields the same identifier and is a
    /// no-op on the second call.
    pub fn put(&self, content: Bytes) -> anyhow::Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(&content);
        let oid = ObjectId::try_parse(format!("{:x}", hasher.finalize()))?;

        let object_path = self.path.join(oid.to_file_name());
        if !object_path.exists() {
            self.write_object(object_path, content)?;
        }

        Ok(oid)
    }

    pub fn get(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_file_name());

        if !object_path.exists() {
            return Err(RepoError::NotFound(object_id.clone()).into());
        }

        self.read_object(object_path)
    }

    pub fn store(&self, object: impl Object) -> anyhow::Result<ObjectId> {
        self.put(object.serialize()?)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectKind> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        let object = match object_type {
            ObjectType::Blob => ObjectKind::Blob(
                Blob::deserialize(object_reader).map_err(|e| self.corrupt(object_id, e))?,
            ),
            ObjectType::Commit => ObjectKind::Commit(
                Commit::deserialize(object_reader).map_err(|e| self.corrupt(object_id, e))?,
            ),
        };

        Ok(object)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object(object_id)? {
            ObjectKind::Blob(blob) => Ok(Some(blob)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(object_id)? {
            ObjectKind::Commit(commit) => Ok(Some(commit)),
            _ => Ok(None),
        }
    }

    /// Load a commit, failing if the identifier names anything else
    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        self.parse_object_as_commit(object_id)?
            .ok_or_else(|| RepoError::CommitNotFound(object_id.to_string()).into())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.get(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)
            .map_err(|e| self.corrupt(object_id, e))?;

        Ok((object_type, object_reader))
    }

    fn corrupt(&self, object_id: &ObjectId, source: anyhow::Error) -> anyhow::Error {
        RepoError::CorruptObject {
            id: object_id.clone(),
            reason: source.to_string(),
        }
        .into()
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// List every identifier present in the store
    ///
    /// Used by global-log and find, which inspect all commit objects.
    pub fn list_object_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        Ok(walkdir::WalkDir::new(&self.path)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                ObjectId::try_parse(entry.file_name().to_string_lossy().to_string()).ok()
            })
            .collect())
    }

    /// Find all objects whose identifier starts with the given prefix
    ///
    /// Used to resolve abbreviated commit ids; more than one match means the
    /// prefix is ambiguous.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self
            .list_object_ids()?
            .into_iter()
            .filter(|oid| oid.as_ref().starts_with(prefix))
            .collect())
    }
}
