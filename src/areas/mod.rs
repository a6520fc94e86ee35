//! Core repository components
//!
//! The fundamental building blocks of a repository:
//!
//! - `database`: content-addressed object store for blobs and commits
//! - `stage`: staging area tracking pending additions and removals
//! - `refs`: branch pointers and HEAD
//! - `repository`: high-level coordination and shared configuration
//! - `workspace`: working directory file system operations

pub(crate) mod database;
pub(crate) mod refs;
pub mod repository;
pub(crate) mod stage;
pub(crate) mod workspace;
