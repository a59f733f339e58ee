//! Parent/child link resolution and detachment.
//!
//! Child links are `CHILD_OF` associations stored as `origin = child`,
//! `destination = parent`. Nothing here recurses: these are the flat,
//! single-level operations the deletion engine and command handlers build
//! on.

use anyhow::Result;
use rusqlite::Connection;

use crate::db::query::{self, QueryAssociation};
use crate::model::association::AssociationType;

/// Every `CHILD_OF` association linking `child_id` to `parent_id`.
///
/// Scans the child's outgoing associations and keeps those whose resolved
/// destination is the parent. Duplicate child links are legitimate and all
/// returned; no matching link yields an empty vec, never an error.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn child_associations(
    conn: &Connection,
    parent_id: &str,
    child_id: &str,
) -> Result<Vec<QueryAssociation>> {
    let outgoing = query::outgoing_associations(conn, child_id)?;
    Ok(outgoing
        .into_iter()
        .filter(|assoc| {
            assoc.assoc_type == AssociationType::ChildOf
                && assoc.destination_item_id.as_deref() == Some(parent_id)
        })
        .collect())
}

/// Detach `child_id` from `parent_id` by removing every `CHILD_OF`
/// association between them.
///
/// Idempotent: detaching a child that is not attached removes nothing and
/// is not an error. Other association types between the two items, and
/// child links to other parents, are left untouched.
///
/// # Errors
///
/// Returns an error if the store query or removal fails.
pub fn detach_child(conn: &Connection, parent_id: &str, child_id: &str) -> Result<()> {
    let associations = child_associations(conn, parent_id, child_id)?;
    for assoc in &associations {
        query::remove_association(conn, &assoc.assoc_id)?;
    }
    if !associations.is_empty() {
        tracing::debug!(
            parent_id,
            child_id,
            removed = associations.len(),
            "detached child"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{child_associations, detach_child};
    use crate::db::{migrations, query};
    use crate::model::association::{AssociationType, NewAssociation};
    use crate::model::item::{NewDocument, NewItem};
    use rusqlite::Connection;

    fn test_db() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        migrations::migrate(&mut conn).expect("migrate");
        conn
    }

    fn seed(conn: &Connection) {
        query::insert_document(
            conn,
            &NewDocument {
                doc_id: "doc-1".to_string(),
                title: "Doc".to_string(),
            },
        )
        .expect("insert document");
        for (item_id, identifier) in [("cg-p", "urn:p"), ("cg-q", "urn:q"), ("cg-x", "urn:x")] {
            query::insert_item(
                conn,
                &NewItem {
                    item_id: item_id.to_string(),
                    doc_id: "doc-1".to_string(),
                    identifier: identifier.to_string(),
                    full_statement: format!("Statement for {item_id}"),
                    ..NewItem::default()
                },
            )
            .expect("insert item");
        }
    }

    fn link(conn: &Connection, assoc_id: &str, assoc_type: AssociationType, origin: &str, destination: &str) {
        query::insert_association(
            conn,
            &NewAssociation {
                assoc_id: assoc_id.to_string(),
                doc_id: "doc-1".to_string(),
                assoc_type,
                origin_identifier: origin.to_string(),
                destination_identifier: destination.to_string(),
            },
        )
        .expect("insert association");
    }

    #[test]
    fn finds_single_child_link() {
        let conn = test_db();
        seed(&conn);
        link(&conn, "as-1", AssociationType::ChildOf, "urn:x", "urn:p");

        let found = child_associations(&conn, "cg-p", "cg-x").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].assoc_id, "as-1");
    }

    #[test]
    fn returns_all_duplicate_links() {
        let conn = test_db();
        seed(&conn);
        link(&conn, "as-1", AssociationType::ChildOf, "urn:x", "urn:p");
        link(&conn, "as-2", AssociationType::ChildOf, "urn:x", "urn:p");

        let found = child_associations(&conn, "cg-p", "cg-x").unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn ignores_other_types_and_other_parents() {
        let conn = test_db();
        seed(&conn);
        link(&conn, "as-rel", AssociationType::IsRelatedTo, "urn:x", "urn:p");
        link(&conn, "as-q", AssociationType::ChildOf, "urn:x", "urn:q");

        assert!(child_associations(&conn, "cg-p", "cg-x").unwrap().is_empty());
        assert_eq!(child_associations(&conn, "cg-q", "cg-x").unwrap().len(), 1);
    }

    #[test]
    fn direction_matters_parent_is_destination() {
        let conn = test_db();
        seed(&conn);
        // Backwards row: parent stored as origin. Not a child link of x.
        link(&conn, "as-bad", AssociationType::ChildOf, "urn:p", "urn:x");

        assert!(child_associations(&conn, "cg-p", "cg-x").unwrap().is_empty());
    }

    #[test]
    fn detach_removes_every_matching_link() {
        let conn = test_db();
        seed(&conn);
        link(&conn, "as-1", AssociationType::ChildOf, "urn:x", "urn:p");
        link(&conn, "as-2", AssociationType::ChildOf, "urn:x", "urn:p");
        link(&conn, "as-q", AssociationType::ChildOf, "urn:x", "urn:q");

        detach_child(&conn, "cg-p", "cg-x").unwrap();

        assert!(child_associations(&conn, "cg-p", "cg-x").unwrap().is_empty());
        // The link to the other parent survives.
        assert_eq!(child_associations(&conn, "cg-q", "cg-x").unwrap().len(), 1);
    }

    #[test]
    fn detach_without_relationship_is_a_noop() {
        let conn = test_db();
        seed(&conn);
        link(&conn, "as-rel", AssociationType::IsRelatedTo, "urn:x", "urn:p");

        detach_child(&conn, "cg-p", "cg-x").unwrap();

        // The unrelated association is untouched.
        assert!(query::get_association(&conn, "as-rel").unwrap().is_some());
    }
}
