//! # ALMA Models Crate
//!
//! Data contracts for the ALMA audio recommendation service.
//!
//! ## Main Components
//!
//! - **types**: request types, ranked recommendations, the response envelope
//! - **ear**: ear measurements, pixel geometry, fit matches, product dimensions
//! - **image**: the annotated image and its placeholder sentinel
//! - **format**: IDR currency, confidence and tier badge display helpers
//! - **error**: validation errors
//!
//! ## Example Usage
//!
//! ```ignore
//! use alma_models::{RecommendationRequest, RecommendationResponse, UseCase};
//!
//! let request = RecommendationRequest::new("recommend earbuds")
//!     .with_budget_min(1_000_000)
//!     .with_budget_max(3_000_000)
//!     .with_use_case(UseCase::Gaming);
//! request.validate()?;
//!
//! let response: RecommendationResponse = serde_json::from_str(&body)?;
//! response.validate()?;
//! for rec in &response.recommendations {
//!     println!("#{} {} [{}]", rec.rank, rec.display_name(), rec.tier_rating.label());
//! }
//! ```

pub mod ear;
pub mod error;
pub mod format;
pub mod image;
pub mod types;

pub use ear::{
    BoundingBox, CaseDimensions, DiameterRange, EarAnalysis, EarAnalysisResponse, EarCoordinates,
    EarMeasurements, EarbudBody, EarbudDimensions, FitMatch, HeadphoneBody, HeadphoneDimensions,
    KeyLandmarks, MeasurementLine, PhysicalDimensions, Point,
};
pub use error::{Result, ValidationError};
pub use format::{Badge, format_budget_range, format_confidence, format_idr, format_mm};
pub use image::{AnnotatedImage, PLACEHOLDER_SENTINEL};
pub use types::{
    DebugTestResponse, EarAnalysisRequest, HealthResponse, Idr, ImageUpload, Marketplace,
    PurchaseLinks, Recommendation, RecommendationRequest, RecommendationResponse, TierRating,
    UseCase,
};
