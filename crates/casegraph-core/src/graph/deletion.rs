//! Structurally safe item and subtree removal.
//!
//! # Overview
//!
//! Removing an item must never leave dangling association rows pointing at
//! it: every association that references the item as a resolved origin or
//! destination — whatever its type — is removed together with the item.
//! An item with children cannot be removed directly; that is a soft
//! rejection, not a fault, and callers decide whether to retry with
//! [`remove_subtree`].
//!
//! # Transactions
//!
//! Each public operation runs its whole read-then-mutate sequence inside a
//! single SQLite transaction, so the children check and the removals are
//! one atomic unit: no caller observes a half-deleted item, and a failed
//! subtree removal rolls back completely. Cross-process writers should
//! additionally hold [`crate::lock::StoreWriteLock`].
//!
//! # Cycle guard
//!
//! A well-formed hierarchy is a tree, but a `CHILD_OF` cycle in stored data
//! cannot be ruled out. Subtree removal tracks visited ids for the duration
//! of one call and treats a revisit as [`GraphError::CorruptHierarchy`]
//! instead of recursing forever.

use anyhow::Context as AnyhowContext;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fmt;

use crate::db::query;
use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors surfaced by the deletion engine.
#[derive(Debug)]
pub enum GraphError {
    /// A `CHILD_OF` cycle was hit while walking a subtree. The stored
    /// hierarchy is corrupt; nothing was removed.
    CorruptHierarchy { item_id: String },
    /// An underlying store error.
    Db(anyhow::Error),
}

impl GraphError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CorruptHierarchy { .. } => ErrorCode::CorruptHierarchy,
            Self::Db(_) => ErrorCode::StoreFault,
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptHierarchy { item_id } => write!(
                f,
                "{}: child-of cycle through item '{item_id}'",
                self.code().code()
            ),
            Self::Db(e) => write!(f, "{}: store error: {e}", self.code().code()),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Db(e) = self {
            Some(e.as_ref())
        } else {
            None
        }
    }
}

impl From<anyhow::Error> for GraphError {
    fn from(e: anyhow::Error) -> Self {
        Self::Db(e)
    }
}

// ---------------------------------------------------------------------------
// Core operations
// ---------------------------------------------------------------------------

/// Remove a single item, provided its derived children set is empty.
///
/// Returns `Ok(false)` without mutating anything when the item still has
/// children — structurally blocked is a result, not a fault. Otherwise
/// removes every association incident to the item (any type, either
/// resolved endpoint) and then the item row itself, atomically, and
/// returns `Ok(true)`.
///
/// An id with no stored row has an empty children set and is treated as
/// already removed.
///
/// # Errors
///
/// Returns [`GraphError::Db`] for store failures; the transaction is
/// rolled back.
pub fn remove_leaf(conn: &mut Connection, item_id: &str) -> Result<bool, GraphError> {
    let tx = conn.transaction().context("begin leaf removal")?;
    let removed = remove_leaf_in(&tx, item_id)?;
    tx.commit().context("commit leaf removal")?;
    Ok(removed)
}

/// Remove an item and its entire derived subtree, deepest descendants
/// first.
///
/// Children are removed before their parent, so the parent is always a
/// leaf by the time its own removal runs and the soft-failure branch of
/// the leaf path is unreachable here. The whole walk runs in one
/// transaction: on any error nothing is removed.
///
/// Returns whether the top-level item was removed — always `true` absent a
/// store failure.
///
/// # Errors
///
/// Returns [`GraphError::CorruptHierarchy`] if the walk revisits an item
/// (a `CHILD_OF` cycle), or [`GraphError::Db`] for store failures. Either
/// way the transaction is rolled back.
pub fn remove_subtree(conn: &mut Connection, item_id: &str) -> Result<bool, GraphError> {
    let tx = conn.transaction().context("begin subtree removal")?;
    let mut visited: HashSet<String> = HashSet::new();
    let removed = remove_subtree_in(&tx, item_id, &mut visited)?;
    tx.commit().context("commit subtree removal")?;
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Internals (run inside the caller's transaction)
// ---------------------------------------------------------------------------

fn remove_leaf_in(conn: &Connection, item_id: &str) -> Result<bool, GraphError> {
    let children = query::children_of(conn, item_id)?;
    if !children.is_empty() {
        tracing::warn!(
            item_id,
            children = children.len(),
            "refusing to remove item that still has children"
        );
        return Ok(false);
    }

    let incident = query::incident_associations(conn, item_id)?;
    for assoc in &incident {
        query::remove_association(conn, &assoc.assoc_id)?;
    }
    query::remove_item_row(conn, item_id)?;

    tracing::debug!(
        item_id,
        associations = incident.len(),
        "removed item and incident associations"
    );
    Ok(true)
}

fn remove_subtree_in(
    conn: &Connection,
    item_id: &str,
    visited: &mut HashSet<String>,
) -> Result<bool, GraphError> {
    if !visited.insert(item_id.to_string()) {
        return Err(GraphError::CorruptHierarchy {
            item_id: item_id.to_string(),
        });
    }

    for child in query::children_of(conn, item_id)? {
        remove_subtree_in(conn, &child.item_id, visited)?;
    }

    remove_leaf_in(conn, item_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
