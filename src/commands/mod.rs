//! Command implementations
//!
//! One file per user-facing command; each extends [`Repository`] with an
//! `impl` block so commands compose the areas and artifacts without owning
//! state of their own.
//!
//! [`Repository`]: crate::areas::repository::Repository

pub mod porcelain;
