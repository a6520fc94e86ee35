//! Content-addressed object types
//!
//! Everything the repository stores permanently is an object identified by
//! the SHA-1 of its canonical serialization. There are two kinds:
//!
//! - **Blob**: a snapshot of one file's name and byte content
//! - **Commit**: a snapshot of the whole tracked tree plus metadata
//!
//! Both serialize to `<type> <size>\0<body>`; the body layouts are explicit
//! and versioned by construction, so identifiers depend only on the
//! documented byte layout.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
