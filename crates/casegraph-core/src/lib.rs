//! casegraph-core library.
//!
//! An association-graph engine for hierarchical competency frameworks:
//! documents contain items, items are connected by typed directed
//! associations, and this crate provides the store-backed operations over
//! that graph — deterministic per-document ordering, transitive
//! "exact match" equivalence closure, and structurally safe subtree
//! deletion.
//!
//! # Conventions
//!
//! - **Errors**: store-layer functions return `anyhow::Result` with
//!   `.context(...)`; graph operations with a domain failure mode carry
//!   their own error enum (see [`graph::deletion::GraphError`]).
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Timestamps**: microseconds since the Unix epoch (`*_at_us`).

pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod lock;
pub mod model;
