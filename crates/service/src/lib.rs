#![forbid(unsafe_code)]

//! Document-level use cases over [`dt_storage::SqliteStore`].
//!
//! Callers hand in an already authenticated [`OwnerId`]; every operation is
//! scoped to that owner and fails with a [`ServiceError`] carrying a stable code.

mod error;
mod inputs;
mod service;

pub use dt_core::ids::{BlockId, DocumentId, OwnerId};
pub use error::ServiceError;
pub use inputs::*;
pub use service::DocumentService;
