//! Errors surfaced by document import and export.
//!
//! Editing operations never fail; they degrade to no-ops.

use crate::node::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
}

pub type BoardResult<T> = Result<T, BoardError>;
