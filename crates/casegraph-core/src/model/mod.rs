//! Typed domain model shared by the store and the graph engine.
//!
//! ## Submodules
//!
//! - [`association`] — the association-type enumeration and the insert
//!   record for new association rows.
//! - [`item`] — insert records for documents and items.

pub mod association;
pub mod item;
