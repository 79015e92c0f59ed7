#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod block;
pub mod position;

use thiserror::Error;

// Re-export commonly used types
pub use block::BlockType;
pub use position::WorldPos;

/// Errors raised when decoding the stable string encodings used in save files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The block name is not part of the closed block set.
    #[error("unknown block type: {0}")]
    UnknownBlock(String),
    /// The position key is not three comma-separated integers.
    #[error("invalid position key: {0:?}")]
    InvalidPositionKey(String),
}
