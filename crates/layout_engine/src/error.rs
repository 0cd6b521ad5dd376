//! Error types for layout engine

use render_model::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Unknown presentation node {0}")]
    UnknownNode(NodeId),

    #[error("Presentation node {0} is being placed and cannot be changed")]
    NodeBusy(NodeId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration decoding failed: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    #[error("Diagnostic channel is full")]
    DiagnosticChannelFull,

    #[error("Diagnostic channel is closed")]
    DiagnosticChannelClosed,
}

pub type Result<T> = std::result::Result<T, PlacementError>;
