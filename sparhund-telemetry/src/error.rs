use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("A global tracing subscriber is already installed: {0}")]
    SubscriberInstalled(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
