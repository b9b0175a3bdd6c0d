#![forbid(unsafe_code)]

mod blocks_tx;
mod paths;
mod rows;

pub(super) use blocks_tx::*;
pub(super) use paths::*;
pub(super) use rows::*;
