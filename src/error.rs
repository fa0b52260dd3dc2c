use thiserror::Error;

/// Single failure signal handed back to callers of the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("detection model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("malformed detection: {0}")]
    MalformedDetection(String),
    #[error("{0}")]
    UnsupportedUpload(String),
    #[error("failed to encode result image: {0}")]
    Encode(String),
}

impl From<image::ImageError> for DetectError {
    fn from(err: image::ImageError) -> Self {
        DetectError::InvalidImage(err.to_string())
    }
}
