#![forbid(unsafe_code)]

//! SQLite-backed storage engine for owner-scoped document forests.
//!
//! Documents form a forest per owner and carry an ordered set of blocks.
//! Deletion is two-phase: documents go to trash first and are purged later.

mod store;

pub use store::*;
