#![forbid(unsafe_code)]

use crate::error::ServiceError;
use crate::inputs::{CreateDocumentInput, MoveDocumentInput, UpdateDocumentInput};
use dt_core::fields::{normalize_title, validate_block_position, validate_block_type};
use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::{Block, Document, DocumentWithBlocks, NewBlock, TrashPurge};
use dt_core::tree::TreeNode;
use dt_storage::{
    CreateDocumentRequest, MoveDocumentRequest, SqliteStore, StoreConfig, UpdateDocumentRequest,
    UpdateDocumentWithBlocksRequest,
};
use tracing::instrument;

/// Orchestrates document use cases for the request layer.
#[derive(Debug)]
pub struct DocumentService {
    store: SqliteStore,
}

impl DocumentService {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn open(config: StoreConfig) -> Result<Self, ServiceError> {
        Ok(Self::new(SqliteStore::open_with_config(config)?))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn into_store(self) -> SqliteStore {
        self.store
    }

    #[instrument(skip_all, fields(owner = %owner), err)]
    pub fn create_document(
        &mut self,
        owner: OwnerId,
        input: CreateDocumentInput,
    ) -> Result<Document, ServiceError> {
        let title = normalize_title(&input.title).map_err(|e| ServiceError::invalid(e.message()))?;
        let document = self.store.create_document(CreateDocumentRequest {
            owner_id: owner,
            parent_id: input.parent_id,
            title,
            content: input.content,
        })?;
        Ok(document)
    }

    /// The document with its blocks in render order.
    pub fn open_document(
        &self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<DocumentWithBlocks, ServiceError> {
        let document = self.store.get_document(owner, document_id)?;
        let blocks = self.store.get_blocks(document.id)?;
        Ok(DocumentWithBlocks { document, blocks })
    }

    pub fn blocks(
        &self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<Vec<Block>, ServiceError> {
        Ok(self.open_document(owner, document_id)?.blocks)
    }

    /// Title/content only; the block set is left as is.
    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn update_document(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
        title: &str,
        content: &str,
        expected_revision: Option<i64>,
    ) -> Result<Document, ServiceError> {
        let title = normalize_title(title).map_err(|e| ServiceError::invalid(e.message()))?;
        Ok(self.store.update_document(UpdateDocumentRequest {
            owner_id: owner,
            document_id,
            title,
            content: content.to_string(),
            expected_revision,
        })?)
    }

    /// Saves title, content and the full block set as one unit.
    #[instrument(
        skip_all,
        fields(owner = %owner, document = %document_id, blocks = input.blocks.len()),
        err
    )]
    pub fn update_document_with_blocks(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
        input: UpdateDocumentInput,
    ) -> Result<DocumentWithBlocks, ServiceError> {
        let title = normalize_title(&input.title).map_err(|e| ServiceError::invalid(e.message()))?;
        for (index, block) in input.blocks.iter().enumerate() {
            validate_block(block).map_err(|message| {
                ServiceError::invalid(format!("blocks[{index}]: {message}"))
            })?;
        }

        Ok(self
            .store
            .update_document_with_blocks(UpdateDocumentWithBlocksRequest {
                owner_id: owner,
                document_id,
                title,
                content: input.content,
                blocks: input.blocks,
                expected_revision: input.expected_revision,
            })?)
    }

    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn append_block(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
        block: NewBlock,
    ) -> Result<Block, ServiceError> {
        validate_block(&block).map_err(ServiceError::invalid)?;
        let document = self.store.get_document(owner, document_id)?;
        if document.is_deleted {
            return Err(ServiceError::invalid("document is in trash"));
        }
        Ok(self.store.create_block(document.id, block)?)
    }

    pub fn list_documents(&self, owner: OwnerId) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.list_all_documents(owner)?)
    }

    pub fn document_tree(&self, owner: OwnerId) -> Result<Vec<TreeNode>, ServiceError> {
        Ok(self.store.get_document_tree(owner)?)
    }

    pub fn breadcrumbs(
        &self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.document_path(owner, document_id)?)
    }

    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn move_document(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
        input: MoveDocumentInput,
    ) -> Result<Document, ServiceError> {
        Ok(self.store.move_document(MoveDocumentRequest {
            owner_id: owner,
            document_id,
            new_parent_id: input.parent_id,
            sort_order: input.sort_order,
            expected_revision: input.expected_revision,
        })?)
    }

    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn trash_document(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<Document, ServiceError> {
        Ok(self.store.soft_delete(owner, document_id)?)
    }

    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn restore_document(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<Document, ServiceError> {
        Ok(self.store.restore(owner, document_id)?)
    }

    #[instrument(skip_all, fields(owner = %owner, document = %document_id), err)]
    pub fn delete_forever(
        &mut self,
        owner: OwnerId,
        document_id: DocumentId,
    ) -> Result<TrashPurge, ServiceError> {
        Ok(self.store.permanent_delete(owner, document_id)?)
    }

    pub fn trash(&self, owner: OwnerId) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.list_trashed(owner)?)
    }

    #[instrument(skip_all, fields(owner = %owner), err)]
    pub fn empty_trash(&mut self, owner: OwnerId) -> Result<TrashPurge, ServiceError> {
        Ok(self.store.empty_trash(owner)?)
    }
}

fn validate_block(block: &NewBlock) -> Result<(), &'static str> {
    validate_block_type(&block.block_type).map_err(|e| e.message())?;
    validate_block_position(block.position).map_err(|e| e.message())
}
