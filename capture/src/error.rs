use thiserror::Error;

use crate::session::{Action, CaptureState};

/// Failures while acquiring an image on the client.
///
/// None of these reach the network; they are shown inline and leave the
/// capture session as it was.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("not an image: {mime}")]
    NotAnImage { mime: String },
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("cannot {action:?} while {state:?}")]
    InvalidTransition { state: CaptureState, action: Action },
    #[error("no active camera stream")]
    NoActiveStream,
    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Payload(#[from] contract::PayloadError),
    #[error("image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CaptureError {
    /// Message suitable for an inline diagnostic next to the capture controls.
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::NotAnImage { .. } => "Please upload an image file".into(),
            CaptureError::TooLarge { .. } => "Please upload an image smaller than 5MB".into(),
            CaptureError::CameraUnavailable(_) => {
                "Unable to access the camera. Check permissions and try again.".into()
            }
            other => other.to_string(),
        }
    }
}

/// Failures of a recommendation submission.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The exchange itself failed, or the reply could not be read.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub const FALLBACK: &'static str = "Failed to get recommendations. Please try again.";
    /// Used when a rejection carries no `error` field.
    pub const REJECTED_FALLBACK: &'static str = "An error occurred";

    /// Message for the failed state: the server's `error` field when it sent
    /// one, otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Transport(_) => Self::FALLBACK.to_string(),
        }
    }
}
