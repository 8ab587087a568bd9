use photobooth_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The bytes are not an image in a supported format, or are corrupt.
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// An input had no bytes or zero pixels.
    #[error("{0} image is empty")]
    Empty(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The segmentation model could not be reached or returned garbage.
    #[error("Background segmentation failed: {0}")]
    Segmentation(String),

    /// A blocking image task panicked or was aborted.
    #[error("Image worker failed: {0}")]
    Worker(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
