// src/mapping/mod.rs

//! ID correspondence between source tasks and tracker issues.
//!
//! - [`store`] is the in-memory table the sync pipeline reads and writes.
//! - [`document`] is its on-disk JSON form, used to persist and resume runs.

pub mod document;
pub mod store;

pub use document::{MAPPING_VERSION, MappingDocument};
pub use store::{MappingEntry, MappingStore, MappingSummary};
