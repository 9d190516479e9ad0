//! Error types for conversions

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransformError>;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A generic value outside the accepted primitive/container
    /// vocabulary reached the converter.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("JSON round trip failed for {stage}: {source}")]
    Encoding {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("module did not encode to an object")]
    NotAnObject,
}

impl TransformError {
    pub(crate) fn unsupported_number(number: &serde_json::Number) -> Self {
        TransformError::UnsupportedType(format!("number {number} out of range"))
    }
}
