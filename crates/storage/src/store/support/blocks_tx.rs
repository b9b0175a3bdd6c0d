#![forbid(unsafe_code)]

use super::super::StoreError;
use super::rows::{BLOCK_COLUMNS, BlockRow};
use dt_core::ids::{BlockId, DocumentId};
use dt_core::model::{Block, NewBlock};
use rusqlite::{Connection, params};

pub(in crate::store) fn select_blocks_tx(
    conn: &Connection,
    document_id: DocumentId,
) -> Result<Vec<Block>, StoreError> {
    let sql = format!(
        "SELECT {BLOCK_COLUMNS} FROM blocks WHERE document_id=?1 ORDER BY position ASC, id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![document_id.get()], BlockRow::read)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_block()?);
    }
    Ok(out)
}

pub(in crate::store) fn block_tx(conn: &Connection, id: BlockId) -> Result<Block, StoreError> {
    let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE id=?1");
    conn.query_row(&sql, params![id.get()], BlockRow::read)?
        .into_block()
}

pub(in crate::store) fn delete_blocks_tx(
    conn: &Connection,
    document_id: DocumentId,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM blocks WHERE document_id=?1",
        params![document_id.get()],
    )?)
}

pub(in crate::store) fn next_block_position_tx(
    conn: &Connection,
    document_id: DocumentId,
) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM blocks WHERE document_id=?1",
        params![document_id.get()],
        |row| row.get::<_, i64>(0),
    )?)
}

pub(in crate::store) fn insert_block_tx(
    conn: &Connection,
    document_id: DocumentId,
    block: &NewBlock,
    position: i64,
    now_ms: i64,
) -> Result<BlockId, StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO blocks(document_id, type, content, position, created_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        document_id.get(),
        block.block_type,
        block.content,
        position,
        now_ms,
    ])?;
    BlockId::try_new(conn.last_insert_rowid())
        .map_err(|_| StoreError::InvalidInput("invalid block id"))
}

/// Whole-set replace: clears the document's blocks, then inserts `blocks`.
/// A block without a position takes its index in `blocks`.
/// Must run inside the caller's transaction.
pub(in crate::store) fn replace_blocks_tx(
    conn: &Connection,
    document_id: DocumentId,
    blocks: &[NewBlock],
    now_ms: i64,
) -> Result<Vec<Block>, StoreError> {
    delete_blocks_tx(conn, document_id)?;
    for (index, block) in blocks.iter().enumerate() {
        let position = match block.position {
            Some(position) => position,
            None => i64::try_from(index)
                .map_err(|_| StoreError::InvalidInput("numeric overflow"))?,
        };
        insert_block_tx(conn, document_id, block, position, now_ms)?;
    }
    select_blocks_tx(conn, document_id)
}
