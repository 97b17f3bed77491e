use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Pattern compilation failed: {0}")]
    PatternError(String),

    #[error("Invalid expression for {detector}: {source}")]
    Expression {
        detector: &'static str,
        #[source]
        source: regex::Error,
    },
}
