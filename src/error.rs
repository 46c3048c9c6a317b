//! Error type shared by every fallible bridge operation.
//!
//! Bus dispatch itself never fails: unknown channels, subscriptions and
//! correlation ids are no-ops. Only segment access, procedure lookup and
//! message codec work can produce a [`BridgeError`].

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur during bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(
        "Out of bounds on segment '{segment}': offset {offset} + length {len} exceeds capacity {capacity}"
    )]
    OutOfBounds {
        segment: String,
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("Procedure not found: {0}")]
    ProcedureNotFound(String),

    #[error("Segment already exists: {0}")]
    SegmentExists(String),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("RPC router is not bound to a message bus")]
    RouterDetached,

    #[error("Message codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
