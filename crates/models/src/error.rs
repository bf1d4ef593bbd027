//! Error types for the alma-models crate.
//!
//! Every check on a request before it leaves the client, and every
//! invariant check on a decoded response, reports through `ValidationError`.

use thiserror::Error;

/// Errors raised when a request or response breaks the data contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The free-text query was empty or only whitespace
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Both budget bounds were given but the range is inverted
    #[error("Invalid budget range: min {min} is greater than max {max}")]
    BudgetRange { min: u64, max: u64 },

    /// A use-case string outside the fixed vocabulary
    #[error("Unknown use case: {0}")]
    UnknownUseCase(String),

    /// The attached file is not something the service can read as an image
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// A numeric field fell outside its allowed range
    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },

    /// Recommendation ranks must start at 1 or above and strictly increase
    #[error("Recommendation ranks out of order: {previous} followed by {next}")]
    RankOrder { previous: u32, next: u32 },

    /// The annotated image was requested but only the placeholder was sent
    #[error("No annotated image available")]
    NoImage,

    /// The annotated image was not valid base64
    #[error("Annotated image is not valid base64: {0}")]
    ImageEncoding(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ValidationError>;
