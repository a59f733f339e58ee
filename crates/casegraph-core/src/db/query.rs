//! Query helpers for the casegraph store.
//!
//! Provides typed Rust structs and composable query functions for the graph
//! engine's access patterns: item lookup by id or external key, per-document
//! ordered listings, association queries by endpoint set and type, and the
//! insert/remove primitives the deletion engine builds on.
//!
//! All functions take a shared `&Connection` reference and return
//! `anyhow::Result<T>` with typed structs (never raw rows). Mutating
//! functions here are row-level primitives; transactional scoping is owned
//! by the callers in [`crate::graph`].

use anyhow::{Context, Result};
use rusqlite::{Connection, params, params_from_iter};

use crate::model::association::{AssociationType, NewAssociation};
use crate::model::item::{NewDocument, NewItem};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A framework document row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    pub doc_id: String,
    pub title: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A framework item row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    pub item_id: String,
    pub doc_id: String,
    pub identifier: String,
    pub human_coding_scheme: Option<String>,
    pub full_statement: String,
    pub rank: Option<i64>,
    pub list_enum_in_source: Option<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A typed directed association row.
///
/// `origin_item_id` / `destination_item_id` are the resolved endpoints and
/// may be `None` for cross-document or not-yet-loaded references; the
/// `*_identifier` columns always carry the external keys as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAssociation {
    pub assoc_id: String,
    pub doc_id: String,
    pub assoc_type: AssociationType,
    pub origin_identifier: String,
    pub origin_item_id: Option<String>,
    pub destination_identifier: String,
    pub destination_item_id: Option<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

const ITEM_COLUMNS: &str = "item_id, doc_id, identifier, human_coding_scheme, \
     full_statement, rank, list_enum_in_source, created_at_us, updated_at_us";

const ASSOC_COLUMNS: &str = "assoc_id, doc_id, assoc_type, origin_identifier, origin_item_id, \
     destination_identifier, destination_item_id, created_at_us, updated_at_us";

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Fetch a single document by exact `doc_id`. Returns `None` if missing.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_document(conn: &Connection, doc_id: &str) -> Result<Option<QueryDocument>> {
    let sql = "SELECT doc_id, title, created_at_us, updated_at_us \
               FROM documents WHERE doc_id = ?1";

    let result = conn.query_row(sql, params![doc_id], |row| {
        Ok(QueryDocument {
            doc_id: row.get(0)?,
            title: row.get(1)?,
            created_at_us: row.get(2)?,
            updated_at_us: row.get(3)?,
        })
    });

    match result {
        Ok(doc) => Ok(Some(doc)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_document for '{doc_id}'")),
    }
}

/// Insert a new document row.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate `doc_id`).
pub fn insert_document(conn: &Connection, doc: &NewDocument) -> Result<()> {
    let now_us = chrono::Utc::now().timestamp_micros();
    conn.execute(
        "INSERT INTO documents (doc_id, title, created_at_us, updated_at_us) \
         VALUES (?1, ?2, ?3, ?3)",
        params![doc.doc_id, doc.title, now_us],
    )
    .with_context(|| format!("insert document '{}'", doc.doc_id))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Fetch a single item by exact `item_id`. Returns `None` if missing.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_item(conn: &Connection, item_id: &str) -> Result<Option<QueryItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1");

    let result = conn.query_row(&sql, params![item_id], row_to_query_item);

    match result {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_item for '{item_id}'")),
    }
}

/// Fetch a single item by its external `identifier`. Returns `None` if no
/// item carries the identifier — this is the seed lookup for closure
/// resolution, and an unknown identifier is not an error.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_item_by_identifier(conn: &Connection, identifier: &str) -> Result<Option<QueryItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE identifier = ?1");

    let result = conn.query_row(&sql, params![identifier], row_to_query_item);

    match result {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("find_item_by_identifier for '{identifier}'")),
    }
}

/// Find every item whose external `identifier` or `human_coding_scheme`
/// equals `key`.
///
/// Coding schemes are not unique, so this may return several items.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_items_by_identifier_or_code(conn: &Connection, key: &str) -> Result<Vec<QueryItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE identifier = ?1 OR human_coding_scheme = ?1 \
         ORDER BY item_id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("prepare find_items_by_identifier_or_code")?;
    let rows = stmt
        .query_map(params![key], row_to_query_item)
        .context("execute find_items_by_identifier_or_code")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row.context("read identifier-or-code row")?);
    }
    Ok(items)
}

/// Like [`find_items_by_identifier_or_code`], restricted to one document.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_items_by_identifier_or_code_in_doc(
    conn: &Connection,
    doc_id: &str,
    key: &str,
) -> Result<Vec<QueryItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE doc_id = ?1 AND (identifier = ?2 OR human_coding_scheme = ?2) \
         ORDER BY item_id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("prepare find_items_by_identifier_or_code_in_doc")?;
    let rows = stmt
        .query_map(params![doc_id, key], row_to_query_item)
        .context("execute find_items_by_identifier_or_code_in_doc")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row.context("read scoped identifier-or-code row")?);
    }
    Ok(items)
}

/// All items of a document in the canonical presentation order:
/// `rank` ascending, then `list_enum_in_source` ascending, then
/// `human_coding_scheme` ascending.
///
/// SQLite sorts NULL keys first within each ascending tier. Ties remaining
/// after all three keys fall back to storage scan order and are **not**
/// guaranteed stable; determinism is only promised up to the three keys.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn ordered_items(conn: &Connection, doc_id: &str) -> Result<Vec<QueryItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE doc_id = ?1 \
         ORDER BY rank ASC, list_enum_in_source ASC, human_coding_scheme ASC"
    );

    let mut stmt = conn.prepare(&sql).context("prepare ordered_items")?;
    let rows = stmt
        .query_map(params![doc_id], row_to_query_item)
        .context("execute ordered_items")?;

    let mut items = Vec::new();
    for row in rows {
        items.push(row.context("read ordered item row")?);
    }
    Ok(items)
}

/// Insert a new item row.
///
/// # Errors
///
/// Returns an error if the insert fails (duplicate id or identifier, or a
/// missing owning document).
pub fn insert_item(conn: &Connection, item: &NewItem) -> Result<()> {
    let now_us = chrono::Utc::now().timestamp_micros();
    conn.execute(
        "INSERT INTO items (
            item_id,
            doc_id,
            identifier,
            human_coding_scheme,
            full_statement,
            rank,
            list_enum_in_source,
            created_at_us,
            updated_at_us
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            item.item_id,
            item.doc_id,
            item.identifier,
            item.human_coding_scheme,
            item.full_statement,
            item.rank,
            item.list_enum_in_source,
            now_us
        ],
    )
    .with_context(|| format!("insert item '{}'", item.item_id))?;
    Ok(())
}

/// Remove a raw item row by id.
///
/// Engine-internal primitive: the public deletion path is
/// [`crate::graph::deletion`], which removes incident associations first.
/// Returns the number of rows removed (0 when the id is already gone).
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_item_row(conn: &Connection, item_id: &str) -> Result<usize> {
    conn.execute("DELETE FROM items WHERE item_id = ?1", params![item_id])
        .with_context(|| format!("remove item row '{item_id}'"))
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

/// Fetch a single association by exact `assoc_id`. Returns `None` if missing.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_association(conn: &Connection, assoc_id: &str) -> Result<Option<QueryAssociation>> {
    let sql = format!("SELECT {ASSOC_COLUMNS} FROM associations WHERE assoc_id = ?1");

    let result = conn.query_row(&sql, params![assoc_id], row_to_query_association);

    match result {
        Ok(assoc) => Ok(Some(assoc)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_association for '{assoc_id}'")),
    }
}

/// Insert a new association row, resolving its endpoint identifiers to item
/// ids where possible.
///
/// An identifier that matches no stored item leaves the corresponding
/// resolved column NULL — the row is still inserted and later traversals
/// skip the unresolved side.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_association(conn: &Connection, assoc: &NewAssociation) -> Result<()> {
    let origin = find_item_by_identifier(conn, &assoc.origin_identifier)?;
    let destination = find_item_by_identifier(conn, &assoc.destination_identifier)?;

    let now_us = chrono::Utc::now().timestamp_micros();
    conn.execute(
        "INSERT INTO associations (
            assoc_id,
            doc_id,
            assoc_type,
            origin_identifier,
            origin_item_id,
            destination_identifier,
            destination_item_id,
            created_at_us,
            updated_at_us
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            assoc.assoc_id,
            assoc.doc_id,
            assoc.assoc_type.as_str(),
            assoc.origin_identifier,
            origin.map(|item| item.item_id),
            assoc.destination_identifier,
            destination.map(|item| item.item_id),
            now_us
        ],
    )
    .with_context(|| format!("insert association '{}'", assoc.assoc_id))?;
    Ok(())
}

/// Associations of the given type whose **resolved origin** is any of
/// `origin_ids`. Rows with an unresolved origin never match.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn associations_from(
    conn: &Connection,
    origin_ids: &[String],
    assoc_type: &AssociationType,
) -> Result<Vec<QueryAssociation>> {
    associations_by_endpoint(conn, "origin_item_id", origin_ids, assoc_type)
}

/// Associations of the given type whose **resolved destination** is any of
/// `destination_ids`. Rows with an unresolved destination never match.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn associations_to(
    conn: &Connection,
    destination_ids: &[String],
    assoc_type: &AssociationType,
) -> Result<Vec<QueryAssociation>> {
    associations_by_endpoint(conn, "destination_item_id", destination_ids, assoc_type)
}

fn associations_by_endpoint(
    conn: &Connection,
    endpoint_column: &str,
    ids: &[String],
    assoc_type: &AssociationType,
) -> Result<Vec<QueryAssociation>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (2..=ids.len() + 1)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {ASSOC_COLUMNS} FROM associations \
         WHERE assoc_type = ?1 AND {endpoint_column} IN ({placeholders}) \
         ORDER BY assoc_id"
    );

    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
        Vec::with_capacity(ids.len() + 1);
    param_values.push(Box::new(assoc_type.as_str().to_string()));
    for id in ids {
        param_values.push(Box::new(id.clone()));
    }
    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare endpoint query on {endpoint_column}"))?;
    let rows = stmt
        .query_map(params_from_iter(params_ref), row_to_query_association)
        .with_context(|| format!("execute endpoint query on {endpoint_column}"))?;

    let mut associations = Vec::new();
    for row in rows {
        associations.push(row.context("read association row")?);
    }
    Ok(associations)
}

/// All associations whose resolved origin is the given item (any type).
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn outgoing_associations(conn: &Connection, item_id: &str) -> Result<Vec<QueryAssociation>> {
    let sql = format!(
        "SELECT {ASSOC_COLUMNS} FROM associations \
         WHERE origin_item_id = ?1 \
         ORDER BY assoc_id"
    );

    let mut stmt = conn.prepare(&sql).context("prepare outgoing_associations")?;
    let rows = stmt
        .query_map(params![item_id], row_to_query_association)
        .context("execute outgoing_associations")?;

    let mut associations = Vec::new();
    for row in rows {
        associations.push(row.context("read outgoing association row")?);
    }
    Ok(associations)
}

/// All associations whose resolved origin **or** resolved destination is the
/// given item, regardless of type.
///
/// Rows that reference the item's external identifier but were never
/// resolved to it are not included; unresolved references are tolerated
/// dangling data.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn incident_associations(conn: &Connection, item_id: &str) -> Result<Vec<QueryAssociation>> {
    let sql = format!(
        "SELECT {ASSOC_COLUMNS} FROM associations \
         WHERE origin_item_id = ?1 OR destination_item_id = ?1 \
         ORDER BY assoc_id"
    );

    let mut stmt = conn.prepare(&sql).context("prepare incident_associations")?;
    let rows = stmt
        .query_map(params![item_id], row_to_query_association)
        .context("execute incident_associations")?;

    let mut associations = Vec::new();
    for row in rows {
        associations.push(row.context("read incident association row")?);
    }
    Ok(associations)
}

/// Remove an association row by id.
///
/// Idempotent: removing an id that no longer exists is a no-op. Returns the
/// number of rows removed (0 or 1).
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_association(conn: &Connection, assoc_id: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM associations WHERE assoc_id = ?1",
        params![assoc_id],
    )
    .with_context(|| format!("remove association '{assoc_id}'"))
}

// ---------------------------------------------------------------------------
// Derived relationships
// ---------------------------------------------------------------------------

/// The derived children of an item: every item X with a `CHILD_OF`
/// association stored as `origin = X`, `destination = item`.
///
/// There is no stored children list — this is always computed from
/// association rows, so any edge mutation is immediately visible here.
/// Duplicate child links collapse to one row per child. Children come back
/// in the canonical (rank, list enum, coding scheme) order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn children_of(conn: &Connection, item_id: &str) -> Result<Vec<QueryItem>> {
    let sql = format!(
        "SELECT DISTINCT i.item_id, i.doc_id, i.identifier, i.human_coding_scheme, \
             i.full_statement, i.rank, i.list_enum_in_source, i.created_at_us, i.updated_at_us \
         FROM items i \
         INNER JOIN associations a ON a.origin_item_id = i.item_id \
         WHERE a.assoc_type = ?1 AND a.destination_item_id = ?2 \
         ORDER BY i.rank ASC, i.list_enum_in_source ASC, i.human_coding_scheme ASC"
    );

    let mut stmt = conn.prepare(&sql).context("prepare children_of")?;
    let rows = stmt
        .query_map(
            params![AssociationType::ChildOf.as_str(), item_id],
            row_to_query_item,
        )
        .context("execute children_of")?;

    let mut children = Vec::new();
    for row in rows {
        children.push(row.context("read child row")?);
    }
    Ok(children)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn row_to_query_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueryItem> {
    Ok(QueryItem {
        item_id: row.get(0)?,
        doc_id: row.get(1)?,
        identifier: row.get(2)?,
        human_coding_scheme: row.get(3)?,
        full_statement: row.get(4)?,
        rank: row.get(5)?,
        list_enum_in_source: row.get(6)?,
        created_at_us: row.get(7)?,
        updated_at_us: row.get(8)?,
    })
}

fn row_to_query_association(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueryAssociation> {
    Ok(QueryAssociation {
        assoc_id: row.get(0)?,
        doc_id: row.get(1)?,
        assoc_type: AssociationType::from(row.get::<_, String>(2)?),
        origin_identifier: row.get(3)?,
        origin_item_id: row.get(4)?,
        destination_identifier: row.get(5)?,
        destination_item_id: row.get(6)?,
        created_at_us: row.get(7)?,
        updated_at_us: row.get(8)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
