//! Canonical SQLite schema for the casegraph store.
//!
//! The schema is normalized around three tables:
//! - `documents` holds framework containers
//! - `items` holds framework nodes, each owned by exactly one document
//! - `associations` holds typed directed edges between items
//!
//! The resolved endpoint columns on `associations` are intentionally not
//! foreign keys: a cross-document or not-yet-loaded endpoint is stored as
//! NULL and a stale resolution is tolerated data, never an integrity
//! violation. `store_meta` tracks the applied schema version.

/// Migration v1: core tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    doc_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    item_id TEXT PRIMARY KEY,
    doc_id TEXT NOT NULL REFERENCES documents(doc_id),
    identifier TEXT NOT NULL UNIQUE,
    human_coding_scheme TEXT,
    full_statement TEXT NOT NULL DEFAULT '',
    rank INTEGER,
    list_enum_in_source TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS associations (
    assoc_id TEXT PRIMARY KEY,
    doc_id TEXT NOT NULL REFERENCES documents(doc_id),
    assoc_type TEXT NOT NULL CHECK (length(trim(assoc_type)) > 0),
    origin_identifier TEXT NOT NULL,
    origin_item_id TEXT,
    destination_identifier TEXT NOT NULL,
    destination_item_id TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: read-path indexes for ordering and closure queries.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_doc_order
    ON items(doc_id, rank, list_enum_in_source, human_coding_scheme);

CREATE INDEX IF NOT EXISTS idx_items_coding_scheme
    ON items(human_coding_scheme);

CREATE INDEX IF NOT EXISTS idx_assoc_origin_type
    ON associations(origin_item_id, assoc_type);

CREATE INDEX IF NOT EXISTS idx_assoc_destination_type
    ON associations(destination_item_id, assoc_type);

CREATE INDEX IF NOT EXISTS idx_assoc_doc
    ON associations(doc_id);

UPDATE store_meta
SET schema_version = 2
WHERE id = 1;
";

/// Indexes expected by ordering, closure, and deletion query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_items_doc_order",
    "idx_items_coding_scheme",
    "idx_assoc_origin_type",
    "idx_assoc_destination_type",
    "idx_assoc_doc",
];

#[cfg(test)]
mod tests {
    use crate::db::migrations;
    use rusqlite::{Connection, params};

    fn seeded_conn() -> rusqlite::Result<Connection> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;

        conn.execute(
            "INSERT INTO documents (doc_id, title, created_at_us, updated_at_us)
             VALUES ('doc-1', 'Mathematics', 1, 1)",
            [],
        )?;

        for idx in 0..24_u32 {
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
                 ) VALUES (?1, 'doc-1', ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    format!("cg-{idx:03}"),
                    format!("urn:item:{idx}"),
                    format!("M.{idx}"),
                    format!("Statement {idx}"),
                    i64::from(idx),
                    format!("{idx}"),
                    i64::from(idx)
                ],
            )?;
        }

        for idx in 0..12_u32 {
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
                 ) VALUES (?1, 'doc-1', 'exact_match_of', ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    format!("as-{idx:03}"),
                    format!("urn:item:{idx}"),
                    format!("cg-{idx:03}"),
                    format!("urn:item:{}", idx + 1),
                    format!("cg-{:03}", idx + 1),
                    i64::from(idx)
                ],
            )?;
        }

        Ok(conn)
    }

    fn query_plan_details(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {sql}"))?;
        let details = stmt
            .query_map([], |row| row.get::<_, String>(3))?
            .collect::<Result<Vec<_>, _>>();
        details
    }

    #[test]
    fn query_plan_uses_doc_order_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT item_id
             FROM items
             WHERE doc_id = 'doc-1'
             ORDER BY rank ASC, list_enum_in_source ASC, human_coding_scheme ASC",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_items_doc_order")),
            "expected ordering index in plan, got: {details:?}"
        );

        Ok(())
    }

    #[test]
    fn query_plan_uses_origin_type_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT assoc_id
             FROM associations
             WHERE assoc_type = 'exact_match_of'
               AND origin_item_id IN ('cg-000', 'cg-001')",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_assoc_origin_type")),
            "expected origin index in plan, got: {details:?}"
        );

        Ok(())
    }

    #[test]
    fn query_plan_uses_destination_type_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT assoc_id
             FROM associations
             WHERE assoc_type = 'exact_match_of'
               AND destination_item_id = 'cg-001'",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_assoc_destination_type")),
            "expected destination index in plan, got: {details:?}"
        );

        Ok(())
    }
}
