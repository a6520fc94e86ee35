//! Data structures and algorithms of the version-control core
//!
//! - `branch`: validated branch names
//! - `checkout`: working-directory migration between commits
//! - `merge`: best-common-ancestor search and three-way resolution
//! - `objects`: content-addressed object types (blob, commit)

pub mod branch;
pub mod checkout;
pub mod merge;
pub mod objects;
