pub mod bca_finder;
pub mod resolution;
