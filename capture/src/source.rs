//! Where images come from: a live camera stream or a user-selected file.

use async_trait::async_trait;
use contract::ImagePayload;
use image::{RgbImage, codecs::jpeg::JpegEncoder};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// Largest file accepted from the upload path.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// JPEG quality used for captured frames.
pub const JPEG_QUALITY: u8 = 80;

/// Which way the requested camera should face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    User,
    Environment,
}

/// Preferences passed to [`Camera::open`]. Devices may pick something else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: Facing,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
        }
    }
}

/// A capture device that hands out live streams.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request a stream. May suspend while the user is asked for permission.
    async fn open(&self, constraints: &CameraConstraints)
    -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// A live stream from a [`Camera`].
#[async_trait]
pub trait MediaStream: Send {
    /// The current frame at the stream's native dimensions.
    async fn frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Release the device. Stopping an already stopped stream does nothing.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// A file picked by the user, not yet read.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
    pub size: u64,
    contents: Contents,
}

#[derive(Clone, Debug)]
enum Contents {
    Disk(PathBuf),
    Memory(Vec<u8>),
}

impl SelectedFile {
    /// A file whose bytes are already in memory (drag and drop, tests).
    pub fn in_memory(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            contents: Contents::Memory(bytes),
        }
    }

    /// Describe a file on disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime: mime.essence_str().to_string(),
            size: meta.len(),
            contents: Contents::Disk(path.to_path_buf()),
        })
    }

    /// Type and size checks, done before any bytes are read.
    pub fn check(&self) -> Result<(), CaptureError> {
        if !self.mime.starts_with("image/") {
            return Err(CaptureError::NotAnImage {
                mime: self.mime.clone(),
            });
        }
        if self.size > MAX_UPLOAD_BYTES {
            return Err(CaptureError::TooLarge {
                size: self.size,
                limit: MAX_UPLOAD_BYTES,
            });
        }
        Ok(())
    }

    async fn read(self) -> std::io::Result<Vec<u8>> {
        match self.contents {
            Contents::Disk(path) => tokio::fs::read(path).await,
            Contents::Memory(bytes) => Ok(bytes),
        }
    }
}

/// Adapter producing [`ImagePayload`]s from a camera or from files.
#[derive(Clone)]
pub struct ImageSource {
    camera: Arc<dyn Camera>,
    constraints: CameraConstraints,
}

impl ImageSource {
    pub fn new(camera: Arc<dyn Camera>) -> Self {
        Self {
            camera,
            constraints: CameraConstraints::default(),
        }
    }

    /// Open the environment-facing camera. No retry on failure.
    pub async fn start_camera(&self) -> Result<Box<dyn MediaStream>, CaptureError> {
        match self.camera.open(&self.constraints).await {
            Ok(stream) => {
                info!(constraints = ?self.constraints, "camera started");
                Ok(stream)
            }
            Err(err) => {
                warn!(%err, "error accessing camera");
                Err(err)
            }
        }
    }

    /// Grab the current frame as a JPEG data URI.
    ///
    /// The stream is stopped whether or not the grab succeeds. Encoding runs
    /// on the blocking pool.
    pub async fn capture_frame(
        &self,
        stream: &mut dyn MediaStream,
    ) -> Result<ImagePayload, CaptureError> {
        let frame = stream.frame().await;
        stream.stop();
        let frame = frame?;
        debug!(width = frame.width(), height = frame.height(), "frame grabbed");
        tokio::task::spawn_blocking(move || encode_jpeg(&frame)).await?
    }

    /// Validate and decode a user-selected file.
    pub async fn select_file(&self, file: SelectedFile) -> Result<ImagePayload, CaptureError> {
        file.check()?;
        let mime = file.mime.clone();
        let name = file.name.clone();
        let bytes = file.read().await?;
        info!(%name, %mime, bytes = bytes.len(), "file decoded");
        Ok(ImagePayload::from_bytes(&mime, &bytes)?)
    }
}

/// Encode a frame as `data:image/jpeg;base64,...` at [`JPEG_QUALITY`].
pub fn encode_jpeg(frame: &RgbImage) -> Result<ImagePayload, CaptureError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(frame)?;
    Ok(ImagePayload::from_bytes("image/jpeg", &buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn default_constraints_prefer_rear_full_hd() {
        let c = CameraConstraints::default();
        assert_eq!(c.facing, Facing::Environment);
        assert_eq!((c.ideal_width, c.ideal_height), (1920, 1080));
    }

    #[test]
    fn check_rejects_wrong_type_before_size() {
        let file = SelectedFile::in_memory("notes.txt", "text/plain", vec![0; 10]);
        assert!(matches!(file.check(), Err(CaptureError::NotAnImage { .. })));
    }

    #[test]
    fn check_allows_exactly_the_limit() {
        let limit = MAX_UPLOAD_BYTES as usize;
        let at_limit = SelectedFile::in_memory("a.png", "image/png", vec![0; limit]);
        assert!(at_limit.check().is_ok());
        let over = SelectedFile::in_memory("b.png", "image/png", vec![0; limit + 1]);
        assert!(matches!(over.check(), Err(CaptureError::TooLarge { .. })));
    }

    struct StillFrame {
        frame: RgbImage,
        live: bool,
    }

    #[async_trait]
    impl MediaStream for StillFrame {
        async fn frame(&mut self) -> Result<RgbImage, CaptureError> {
            Ok(self.frame.clone())
        }

        fn stop(&mut self) {
            self.live = false;
        }

        fn is_live(&self) -> bool {
            self.live
        }
    }

    struct NoCamera;

    #[async_trait]
    impl Camera for NoCamera {
        async fn open(
            &self,
            _: &CameraConstraints,
        ) -> Result<Box<dyn MediaStream>, CaptureError> {
            Err(CaptureError::CameraUnavailable("none".into()))
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_hd_frame_encodes_on_single_threaded_runtime() {
        let source = ImageSource::new(Arc::new(NoCamera));
        let mut stream = StillFrame {
            frame: RgbImage::from_pixel(1920, 1080, image::Rgb([70, 50, 30])),
            live: true,
        };

        let payload = source.capture_frame(&mut stream).await.unwrap();
        assert!(!stream.is_live());
        let bytes = contract::parse_data_uri(payload.as_str()).unwrap().decode().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (1920, 1080));
    }

    #[test]
    fn jpeg_payload_decodes_to_frame_dimensions() {
        let frame = RgbImage::from_pixel(64, 48, image::Rgb([120, 80, 40]));
        let payload = encode_jpeg(&frame).unwrap();
        assert!(payload.as_str().starts_with("data:image/jpeg;base64,"));
        let bytes = contract::parse_data_uri(payload.as_str()).unwrap().decode().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 48));
    }
}
