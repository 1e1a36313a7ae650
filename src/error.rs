//! Error types for engine operations
//!
//! Input problems (bad sizes, NaN) are clamped rather than reported, and
//! resolution problems travel as [`FailureReason`] on the event bus. What is
//! left here is API misuse and I/O.

use crate::types::ObjectId;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when driving the engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// No object with this id exists on the board
    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),

    /// No placement record exists for this id
    #[error("Unknown placement: {0}")]
    UnknownPlacement(ObjectId),

    /// The placement is not in a state that accepts this call
    #[error("Placement {id} cannot {action} while {status}")]
    InvalidTransition {
        id: ObjectId,
        action: &'static str,
        status: &'static str,
    },

    /// A source object referenced by a placement request is missing
    #[error("Placement source {0} not found")]
    MissingSource(ObjectId),

    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image header could not be read
    #[error("Image probe failed: {0}")]
    Image(#[from] image::ImageError),

    /// JSON error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a placement ended without content.
///
/// The `Display` text is meant to be shown to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "detail")]
pub enum FailureReason {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Content could not be loaded: {0}")]
    LoadFailed(String),

    #[error("Content did not load within {} seconds", .0.as_secs())]
    TimedOut(Duration),

    #[error("Placement was cancelled")]
    Cancelled,
}
