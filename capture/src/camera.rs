use async_trait::async_trait;
use image::RgbImage;
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::debug;

use crate::{
    error::CaptureError,
    source::{Camera, CameraConstraints, MediaStream},
};

/// Reads JPEG or PNG files from disk as simulated camera frames.
///
/// Each opened stream shows the next file matching the pattern, cycling back
/// to the first. A pattern matching nothing behaves like a missing device.
pub struct StillCamera {
    paths: Vec<PathBuf>,
    index: AtomicUsize,
}

impl StillCamera {
    /// Create a camera cycling files matching `pattern`.
    pub fn new(pattern: &str) -> Result<Self, glob::PatternError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        paths.sort();
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Camera for StillCamera {
    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        if self.paths.is_empty() {
            return Err(CaptureError::CameraUnavailable("no frames found".into()));
        }
        let i = self.index.fetch_add(1, Ordering::SeqCst) % self.paths.len();
        let path = self.paths[i].clone();
        debug!(?path, facing = ?constraints.facing, "still camera opened");
        Ok(Box::new(StillStream { path, live: true }))
    }
}

struct StillStream {
    path: PathBuf,
    live: bool,
}

#[async_trait]
impl MediaStream for StillStream {
    async fn frame(&mut self) -> Result<RgbImage, CaptureError> {
        if !self.live {
            return Err(CaptureError::NoActiveStream);
        }
        let bytes = tokio::fs::read(&self.path).await?;
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
        Ok(decoded.to_rgb8())
    }

    fn stop(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
