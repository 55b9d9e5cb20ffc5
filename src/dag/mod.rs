// src/dag/mod.rs

//! Dependency graph resolution.
//!
//! - [`resolver`] turns a list of nodes with dependency ids into a
//!   deterministic tiered ordering, or a [`GraphError`] describing a cycle or
//!   a dangling reference.

pub mod resolver;

pub use resolver::{DependencyNode, GraphError, Tiered, resolve_order, resolved_ids};
