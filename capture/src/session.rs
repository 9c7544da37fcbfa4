use contract::ImagePayload;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    client::{RecommendationClient, SubmissionStatus},
    error::CaptureError,
    source::{ImageSource, MediaStream, SelectedFile},
};

/// Where a [`CaptureSession`] stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// No image, camera off.
    Idle,
    /// Stream live, no image.
    CameraActive,
    /// Image held, camera off.
    Captured,
}

/// User actions a session may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    StartCamera,
    CaptureImage,
    SelectFile,
    Reset,
}

/// The single owner of the camera stream and of the current image.
///
/// The state is derived from what is held: a live stream means
/// `CameraActive`, an image means `Captured`. The two are never held together.
/// Entering `Captured` submits the image exactly once; the outcome is
/// published through [`subscribe`](Self::subscribe).
pub struct CaptureSession {
    source: ImageSource,
    client: RecommendationClient,
    stream: Option<Box<dyn MediaStream>>,
    image: Option<ImagePayload>,
    selected_file: Option<String>,
    diagnostic: Option<String>,
    generation: Arc<AtomicU64>,
    status: Arc<watch::Sender<SubmissionStatus>>,
    in_flight: Option<JoinHandle<()>>,
}

impl CaptureSession {
    pub fn new(source: ImageSource, client: RecommendationClient) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        Self {
            source,
            client,
            stream: None,
            image: None,
            selected_file: None,
            diagnostic: None,
            generation: Arc::new(AtomicU64::new(0)),
            status: Arc::new(status),
            in_flight: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        match (&self.stream, &self.image) {
            (Some(_), _) => CaptureState::CameraActive,
            (None, Some(_)) => CaptureState::Captured,
            (None, None) => CaptureState::Idle,
        }
    }

    /// Image currently held, for preview.
    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Name of the file behind the current image, if it came from the upload path.
    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Last acquisition problem, cleared by the next success or a reset.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn has_live_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Actions offered in the current state.
    pub fn actions(&self) -> Vec<Action> {
        match self.state() {
            CaptureState::Idle => vec![Action::StartCamera, Action::SelectFile],
            CaptureState::CameraActive => {
                vec![Action::CaptureImage, Action::SelectFile, Action::Reset]
            }
            CaptureState::Captured => vec![Action::SelectFile, Action::Reset],
        }
    }

    /// `Idle -> CameraActive`. On failure the session stays `Idle`.
    pub async fn start_camera(&mut self) -> Result<CaptureState, CaptureError> {
        self.ensure(Action::StartCamera)?;
        match self.source.start_camera().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.diagnostic = None;
                Ok(self.state())
            }
            Err(err) => Err(self.diagnose(err)),
        }
    }

    /// `CameraActive -> Captured`. The camera is released before submission.
    ///
    /// If the frame cannot be grabbed the camera is still released and the
    /// session falls back to `Idle`.
    pub async fn capture_frame(&mut self) -> Result<CaptureState, CaptureError> {
        self.ensure(Action::CaptureImage)?;
        let mut stream = self.stream.take().ok_or(CaptureError::NoActiveStream)?;
        let captured = self.source.capture_frame(stream.as_mut()).await;
        drop(stream);
        info!("camera stopped after capture");
        match captured {
            Ok(payload) => {
                self.selected_file = None;
                self.enter_captured(payload);
                Ok(self.state())
            }
            Err(err) => Err(self.diagnose(err)),
        }
    }

    /// Replace any held image with `file`.
    ///
    /// A rejected file (wrong type, too large, unreadable) leaves the session
    /// exactly as it was and submits nothing. An accepted file releases a live
    /// camera first.
    pub async fn select_file(&mut self, file: SelectedFile) -> Result<CaptureState, CaptureError> {
        self.ensure(Action::SelectFile)?;
        let name = file.name.clone();
        match self.source.select_file(file).await {
            Ok(payload) => {
                self.release_camera();
                self.selected_file = Some(name);
                self.enter_captured(payload);
                Ok(self.state())
            }
            Err(err) => Err(self.diagnose(err)),
        }
    }

    /// Back to `Idle`: drop the image, stop the camera, forget the file.
    ///
    /// A submission still in flight is not cancelled; its response is ignored.
    pub fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.release_camera();
        self.image = None;
        self.selected_file = None;
        self.diagnostic = None;
        self.in_flight = None;
        self.status.send_replace(SubmissionStatus::Idle);
        info!("capture reset");
    }

    /// Wait for the current submission, if any, and return the status.
    pub async fn settled(&mut self) -> SubmissionStatus {
        if let Some(handle) = self.in_flight.take() {
            if let Err(err) = handle.await {
                warn!(%err, "submission task failed");
            }
        }
        self.status()
    }

    fn ensure(&self, action: Action) -> Result<(), CaptureError> {
        if self.actions().contains(&action) {
            Ok(())
        } else {
            Err(CaptureError::InvalidTransition {
                state: self.state(),
                action,
            })
        }
    }

    fn diagnose(&mut self, err: CaptureError) -> CaptureError {
        warn!(%err, "image acquisition failed");
        self.diagnostic = Some(err.user_message());
        err
    }

    fn release_camera(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("camera stopped");
        }
    }

    fn enter_captured(&mut self, payload: ImagePayload) {
        debug_assert!(self.stream.is_none(), "camera live while capturing");
        self.image = Some(payload.clone());
        self.diagnostic = None;
        self.submit(payload);
    }

    fn submit(&mut self, payload: ImagePayload) {
        let epoch = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.send_replace(SubmissionStatus::Pending);

        let client = self.client.clone();
        let status = self.status.clone();
        let generation = self.generation.clone();
        debug!(epoch, "submission started");
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = client.submit(&payload).await;
            if let Err(err) = &outcome {
                warn!(%err, "error sending image");
            }
            let next = SubmissionStatus::from_outcome(outcome);
            let applied = status.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) == epoch {
                    *current = next;
                    true
                } else {
                    false
                }
            });
            if !applied {
                debug!(epoch, "stale response dropped");
            }
        }));
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_camera();
    }
}
