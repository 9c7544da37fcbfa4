//! Client side of soil analysis: acquire an image, hold it, submit it.
//!
//! [`ImageSource`] turns a camera frame or a picked file into an
//! [`ImagePayload`](contract::ImagePayload). [`CaptureSession`] owns the camera
//! stream and the current image and submits each new image once through a
//! [`RecommendationClient`].

pub mod camera;
pub mod client;
pub mod error;
pub mod session;
pub mod source;

pub use camera::StillCamera;
pub use client::{RecommendationClient, SubmissionStatus};
pub use error::{CaptureError, ClientError};
pub use session::{Action, CaptureSession, CaptureState};
pub use source::{
    Camera, CameraConstraints, Facing, ImageSource, JPEG_QUALITY, MAX_UPLOAD_BYTES, MediaStream,
    SelectedFile, encode_jpeg,
};
