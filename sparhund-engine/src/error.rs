use sparhund_capture::CaptureError;
use sparhund_detection::DetectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Detector setup failed: {0}")]
    Detection(#[from] DetectionError),

    #[error("Capture reader task failed: {0}")]
    Reader(#[from] tokio::task::JoinError),
}
