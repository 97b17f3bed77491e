use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture could not be opened or its records could not be read.
    #[error("Failed to decode capture '{path}': {source}")]
    DecodeFailure {
        path: String,
        #[source]
        source: pcap::Error,
    },
}
