//! Transitive "exact match" closure over the association graph.
//!
//! # Overview
//!
//! `EXACT_MATCH_OF` associations assert that two items denote the same
//! competency. The rows are stored directionally, but the relation is an
//! equivalence: closure traverses every edge in both directions and may
//! cross document boundaries.
//!
//! # Design
//!
//! The resolver is a fixpoint broadcast, not a frontier-limited BFS: each
//! pass re-queries the store against the *entire accumulated set* of item
//! ids, in both edge directions, and stops when a full pass adds no new
//! member. The set grows monotonically and is bounded by the store's item
//! count, so the pass count is bounded by the diameter of the equivalence
//! component and the loop always terminates. An explicit loop is used
//! rather than recursion — component depth is unbounded by construction
//! and must not be tied to call-stack size.
//!
//! Associations with an unresolved endpoint are skipped, never an error.
//!
//! # Consistency
//!
//! The computation is read-only. Concurrent edge mutations can yield a
//! stale or mixed result; callers that need a point-in-time answer should
//! run the call inside a store transaction.

use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;

use crate::db::query::{self, QueryItem};
use crate::model::association::AssociationType;

/// Resolve the full equivalence class of items connected to the item with
/// the given external `identifier` through any chain of `EXACT_MATCH_OF`
/// associations, in either direction.
///
/// Returns the class keyed by item id, seed included. An identifier that
/// matches no item yields an empty map — that is a valid answer, not an
/// error. Order of iteration is not significant.
///
/// # Errors
///
/// Returns an error only for underlying store failures.
pub fn resolve_exact_match_closure(
    conn: &Connection,
    identifier: &str,
) -> Result<HashMap<String, QueryItem>> {
    let Some(seed) = query::find_item_by_identifier(conn, identifier)? else {
        return Ok(HashMap::new());
    };

    let mut matched: HashMap<String, QueryItem> = HashMap::new();
    matched.insert(seed.item_id.clone(), seed);
    let mut matched_count = 0;

    while matched.len() != matched_count {
        matched_count = matched.len();
        let ids: Vec<String> = matched.keys().cloned().collect();

        for assoc in query::associations_from(conn, &ids, &AssociationType::ExactMatchOf)? {
            if let Some(dest_id) = assoc.destination_item_id {
                add_member(conn, &mut matched, &dest_id)?;
            }
        }

        for assoc in query::associations_to(conn, &ids, &AssociationType::ExactMatchOf)? {
            if let Some(origin_id) = assoc.origin_item_id {
                add_member(conn, &mut matched, &origin_id)?;
            }
        }
    }

    Ok(matched)
}

/// Add the item with `item_id` to the accumulated class if it exists.
///
/// A resolved endpoint id whose item row is gone is treated like an
/// unresolved endpoint: skipped.
fn add_member(
    conn: &Connection,
    matched: &mut HashMap<String, QueryItem>,
    item_id: &str,
) -> Result<()> {
    if matched.contains_key(item_id) {
        return Ok(());
    }
    if let Some(item) = query::get_item(conn, item_id)? {
        matched.insert(item.item_id.clone(), item);
    }
    Ok(())
}
