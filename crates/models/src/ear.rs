//! Ear analysis returned alongside a recommendation or by `/analyze-ear`.
//!
//! Measurements are millimetres; coordinates are pixel positions in the
//! submitted photo, sent as `[x, y]` arrays.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::image::AnnotatedImage;
use crate::types::{Idr, TierRating};

/// A pixel position, decoded from a two-element `[x, y]` array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.0 - self.0).hypot(other.1 - self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
    pub center: Point,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        (self.bottom_right.0 - self.top_left.0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.bottom_right.1 - self.top_left.1).abs()
    }
}

/// A line drawn on the annotated image between two landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementLine {
    pub from: Point,
    pub to: Point,
    pub label: String,
    pub description: String,
}

impl MeasurementLine {
    pub fn length_px(&self) -> f64 {
        self.from.distance_to(&self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLandmarks {
    pub ear_lobe: Point,
    pub ear_top: Point,
    pub tragus: Point,
}

/// Pixel geometry the vision model found in the photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarCoordinates {
    pub ear_bounding_box: BoundingBox,
    pub head_bounding_box: BoundingBox,
    pub ear_canal_center: Point,
    pub concha_boundary: Vec<Point>,
    pub measurement_lines: Vec<MeasurementLine>,
    pub key_landmarks: KeyLandmarks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarMeasurements {
    pub ear_canal_diameter_mm: f64,
    pub concha_width_mm: f64,
    pub concha_depth_mm: f64,
    pub overall_ear_height_mm: f64,
    pub overall_ear_width_mm: f64,
    pub size_category: String,
    pub coordinates: EarCoordinates,
    pub confidence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EarMeasurements {
    /// Notes worth showing; blank notes count as none
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

// =============================================================================
// Physical Dimensions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarbudBody {
    pub length_mm: f64,
    pub width_mm: f64,
    pub weight_grams: f64,
    pub has_stem: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDimensions {
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub weight_grams: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterRange {
    pub min_mm: f64,
    pub max_mm: f64,
}

impl DiameterRange {
    pub fn contains(&self, diameter_mm: f64) -> bool {
        (self.min_mm..=self.max_mm).contains(&diameter_mm)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarbudDimensions {
    pub earbud: EarbudBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<CaseDimensions>,
    pub fit_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ear_canal_diameter_range: Option<DiameterRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadphoneBody {
    pub length_mm: f64,
    pub width_mm: f64,
    pub depth_mm: f64,
    pub weight_grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadphoneDimensions {
    pub headphone: HeadphoneBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_size: Option<String>,
}

/// Product size, either an in-ear earbud or an over/on-ear headphone.
///
/// The service does not tag the shape; the `earbud` or `headphone` key
/// decides which variant applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhysicalDimensions {
    Earbud(EarbudDimensions),
    Headphone(HeadphoneDimensions),
}

impl PhysicalDimensions {
    pub fn weight_grams(&self) -> f64 {
        match self {
            PhysicalDimensions::Earbud(d) => d.earbud.weight_grams,
            PhysicalDimensions::Headphone(d) => d.headphone.weight_grams,
        }
    }

    pub fn fit_size(&self) -> Option<&str> {
        match self {
            PhysicalDimensions::Earbud(d) => Some(d.fit_size.as_str()),
            PhysicalDimensions::Headphone(d) => d.fit_size.as_deref(),
        }
    }

    /// Whether an earbud suits the measured canal.
    ///
    /// `None` for headphones or when the service sent no diameter range.
    pub fn fits_canal(&self, diameter_mm: f64) -> Option<bool> {
        match self {
            PhysicalDimensions::Earbud(d) => d
                .ear_canal_diameter_range
                .map(|range| range.contains(diameter_mm)),
            PhysicalDimensions::Headphone(_) => None,
        }
    }
}

// =============================================================================
// Fit Matches and the Analysis Itself
// =============================================================================

/// A product matched against the measured ear, keyed by `tws_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMatch {
    pub tws_id: String,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub product_type: String,
    /// 0 to 100
    pub fit_score: f64,
    pub fit_reason: String,
    pub physical_dimensions: PhysicalDimensions,
    pub price: Idr,
    #[serde(default)]
    pub tier_rating: TierRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarAnalysis {
    pub measurements: EarMeasurements,
    pub recommendations: Vec<FitMatch>,
    pub annotated_image: AnnotatedImage,
    pub analysis_confidence: String,
}

impl EarAnalysis {
    pub fn validate(&self) -> Result<()> {
        for fit in &self.recommendations {
            if !(0.0..=100.0).contains(&fit.fit_score) {
                return Err(ValidationError::OutOfRange {
                    field: format!("fit_score for {}", fit.tws_id),
                    value: fit.fit_score,
                });
            }
        }
        Ok(())
    }

    /// Fit matches ordered best first
    pub fn best_fits(&self) -> Vec<&FitMatch> {
        let mut fits: Vec<&FitMatch> = self.recommendations.iter().collect();
        fits.sort_by(|a, b| {
            b.fit_score
                .partial_cmp(&a.fit_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fits
    }
}

/// `/analyze-ear` returns the analysis without the ranked product list
pub type EarAnalysisResponse = EarAnalysis;
