#![forbid(unsafe_code)]

use super::{StoreError, now_ms};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(crate) const SCHEMA_VERSION: i64 = 1;

const REQUIRED_TABLES: [&str; 3] = ["store_state", "documents", "blocks"];

/// Refuses databases written by an incompatible layout. An empty database passes.
pub(crate) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let tables = user_tables(conn)?;
    if tables.is_empty() {
        return Ok(());
    }

    // Every table must be ours; with no strangers, equal counts mean none is missing.
    if !tables.iter().all(|name| REQUIRED_TABLES.contains(&name.as_str())) {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }
    if tables.len() != REQUIRED_TABLES.len() {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: required table is missing",
        ));
    }

    let stored = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .ok_or(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        ))?;
    if stored != SCHEMA_VERSION {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        ));
    }
    Ok(())
}

fn user_tables(conn: &Connection) -> Result<BTreeSet<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(names)
}

pub(crate) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          parent_id INTEGER,
          title TEXT NOT NULL,
          content TEXT NOT NULL,
          tree_path TEXT NOT NULL,
          level INTEGER NOT NULL,
          sort_order INTEGER NOT NULL,
          is_deleted INTEGER NOT NULL DEFAULT 0,
          trash_root_id INTEGER,
          deleted_at_ms INTEGER,
          revision INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(parent_id)
            REFERENCES documents(id)
            DEFERRABLE INITIALLY DEFERRED,
          CHECK(parent_id IS NULL OR parent_id <> id),
          CHECK(is_deleted IN (0, 1))
        );

        CREATE INDEX IF NOT EXISTS idx_documents_user_deleted
          ON documents(user_id, is_deleted);

        CREATE INDEX IF NOT EXISTS idx_documents_user_parent
          ON documents(user_id, parent_id, sort_order);

        CREATE INDEX IF NOT EXISTS idx_documents_user_path
          ON documents(user_id, tree_path);

        CREATE TABLE IF NOT EXISTS blocks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          document_id INTEGER NOT NULL,
          type TEXT NOT NULL,
          content TEXT NOT NULL,
          position INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(document_id) REFERENCES documents(id)
        );

        CREATE INDEX IF NOT EXISTS idx_blocks_document_position
          ON blocks(document_id, position, id);
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}
