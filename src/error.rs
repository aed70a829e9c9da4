use thiserror::Error;

/// Errors produced while building a palette or the files around it.
#[derive(Debug, Error)]
pub enum Error {
    /// The sample sequences contained no colors at all.
    #[error("input produced no colors to quantize")]
    InvalidInput,

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("project file line {line}: {message}")]
    Project { line: usize, message: String },

    #[error("texture error: {0}")]
    Texture(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
