#![forbid(unsafe_code)]

use super::*;
use dt_core::ids::DocumentId;
use dt_core::model::{Block, NewBlock};

impl SqliteStore {
    /// Blocks of a document in render order (`position` ascending, then id).
    pub fn get_blocks(&self, document_id: DocumentId) -> Result<Vec<Block>, StoreError> {
        select_blocks_tx(&self.conn, document_id)
    }

    /// Atomically swaps the document's whole block set for `blocks`.
    pub fn replace_blocks(
        &mut self,
        document_id: DocumentId,
        blocks: Vec<NewBlock>,
    ) -> Result<Vec<Block>, StoreError> {
        let now_ms = now_ms();
        let stored = self.write_tx("replace_blocks", |tx| {
            if !document_exists_tx(tx, document_id)? {
                return Err(StoreError::NotFound);
            }
            replace_blocks_tx(tx, document_id, &blocks, now_ms)
        })?;

        tracing::debug!(document = %document_id, blocks = stored.len(), "blocks replaced");
        Ok(stored)
    }

    /// Appends one block; without an explicit position it lands after the last one.
    pub fn create_block(
        &mut self,
        document_id: DocumentId,
        block: NewBlock,
    ) -> Result<Block, StoreError> {
        let now_ms = now_ms();
        let stored = self.write_tx("create_block", |tx| {
            if !document_exists_tx(tx, document_id)? {
                return Err(StoreError::NotFound);
            }
            let position = match block.position {
                Some(position) => position,
                None => next_block_position_tx(tx, document_id)?,
            };
            let id = insert_block_tx(tx, document_id, &block, position, now_ms)?;
            block_tx(tx, id)
        })?;

        tracing::debug!(
            document = %document_id,
            block = %stored.id,
            position = stored.position,
            "block created"
        );
        Ok(stored)
    }

    pub fn delete_blocks_by_document(
        &mut self,
        document_id: DocumentId,
    ) -> Result<usize, StoreError> {
        let removed = self.write_tx("delete_blocks_by_document", |tx| {
            delete_blocks_tx(tx, document_id)
        })?;
        tracing::debug!(document = %document_id, removed, "blocks deleted");
        Ok(removed)
    }
}
