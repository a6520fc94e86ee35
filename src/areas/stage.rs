//! Staging area
//!
//! The pending-change buffer between working-directory edits and the next
//! commit: an addition mapping (path to the blob to track) and a removal
//! mapping (path to the blob being untracked). A path is never present in
//! both mappings at once. The whole record is loaded fresh at the start of
//! every command and written back at the end; nothing is cached across
//! invocations.
//!
//! ## Index File Format
//!
//! ```text
//! "LSTG"            4-byte signature
//! version           u32, big-endian
//! addition count    u32, big-endian
//! removal count     u32, big-endian
//! entries           u16 path length, path bytes, 40-byte blob id
//! ```

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

const SIGNATURE: &[u8; 4] = b"LSTG";
const VERSION: u32 = 1;

/// Path-to-blob mapping kept in sorted order for stable status output
pub type StageEntries = BTreeMap<PathBuf, ObjectId>;

#[derive(Debug, Clone)]
pub struct Stage {
    /// Path to the index file
    path: Box<Path>,
    /// Files staged to be tracked by the next commit
    additions: StageEntries,
    /// Files staged to be untracked by the next commit
    removals: StageEntries,
}

impl Stage {
    pub fn new(path: Box<Path>) -> Self {
        Stage {
            path,
            additions: StageEntries::new(),
            removals: StageEntries::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn additions(&self) -> &StageEntries {
        &self.additions
    }

    pub fn removals(&self) -> &StageEntries {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Stage a path for addition, dropping any pending removal of it
    pub fn stage_add(&mut self, path: PathBuf, blob_id: ObjectId) {
        self.removals.remove(&path);
        self.additions.insert(path, blob_id);
    }

    /// Stage a path for removal, dropping any pending addition of it
    pub fn stage_remove(&mut self, path: PathBuf, blob_id: ObjectId) {
        self.additions.remove(&path);
        self.removals.insert(path, blob_id);
    }

    /// Drop a pending addition without touching pending removals
    pub fn unstage(&mut self, path: &Path) {
        self.additions.remove(path);
    }

    /// Drop any pending change for a path, addition or removal
    pub fn discard(&mut self, path: &Path) {
        self.additions.remove(path);
        self.removals.remove(path);
    }

    pub fn is_staged_for_addition(&self, path: &Path) -> bool {
        self.additions.contains_key(path)
    }

    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
    }

    /// Load the staging record from disk
    ///
    /// A missing or empty index file is an empty stage.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            std::fs::File::create(self.path())?;
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = lock.deref_mut();

        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            anyhow::bail!("Invalid index file signature");
        }

        let version = reader.read_u32::<BigEndian>()?;
        if version != VERSION {
            anyhow::bail!("Unsupported index file version: {}", version);
        }

        let additions_count = reader.read_u32::<BigEndian>()?;
        let removals_count = reader.read_u32::<BigEndian>()?;

        self.additions = Self::parse_entries(&mut reader, additions_count)?;
        self.removals = Self::parse_entries(&mut reader, removals_count)?;

        Ok(())
    }

    /// Persist the staging record
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock and rewrites the file in full.
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;
        let mut writer = lock.deref_mut();

        writer.write_all(SIGNATURE)?;
        writer.write_u32::<BigEndian>(VERSION)?;
        writer.write_u32::<BigEndian>(self.additions.len() as u32)?;
        writer.write_u32::<BigEndian>(self.removals.len() as u32)?;

        Self::write_entries(&mut writer, &self.additions)?;
        Self::write_entries(&mut writer, &self.removals)?;

        Ok(())
    }

    fn parse_entries(reader: &mut impl Read, count: u32) -> anyhow::Result<StageEntries> {
        let mut entries = StageEntries::new();

        for _ in 0..count {
            let path_len = reader.read_u16::<BigEndian>()? as usize;
            let mut path_bytes = vec![0u8; path_len];
            reader.read_exact(&mut path_bytes)?;
            let path = PathBuf::from(String::from_utf8(path_bytes)?);

            let mut oid_bytes = [0u8; OBJECT_ID_LENGTH];
            reader.read_exact(&mut oid_bytes)?;
            let blob_id = ObjectId::try_parse(String::from_utf8(oid_bytes.to_vec())?)?;

            entries.insert(path, blob_id);
        }

        Ok(entries)
    }

    fn write_entries(writer: &mut impl Write, entries: &StageEntries) -> anyhow::Result<()> {
        for (path, blob_id) in entries {
            let path = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Non UTF-8 staged path: {path:?}"))?;

            writer.write_u16::<BigEndian>(path.len() as u16)?;
            writer.write_all(path.as_bytes())?;
            writer.write_all(blob_id.as_ref().as_bytes())?;
        }

        Ok(())
    }
}
