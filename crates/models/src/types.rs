//! Core request and response types for the recommendation service.
//!
//! The request side is built by the client and encoded as multipart form
//! fields. The response side mirrors the JSON the service returns; optional
//! pieces of the payload are modelled explicitly (`Option`, `TierRating::Unrated`,
//! `AnnotatedImage::Unavailable`) so that display code never has to probe for
//! missing keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ear::EarAnalysis;
use crate::error::{Result, ValidationError};
use crate::format::Badge;

/// Amount in Indonesian rupiah. The smallest denomination, no decimals.
pub type Idr = u64;

// =============================================================================
// Request-side Types
// =============================================================================

/// Primary listening scenario the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UseCase {
    #[default]
    ListeningMusic,
    Commuting,
    ProfessionalAudio,
    Gaming,
    FitnessSports,
    VideoCalls,
    NoiseCancellation,
    StudioRecording,
}

impl UseCase {
    pub const ALL: [UseCase; 8] = [
        UseCase::ListeningMusic,
        UseCase::Commuting,
        UseCase::ProfessionalAudio,
        UseCase::Gaming,
        UseCase::FitnessSports,
        UseCase::VideoCalls,
        UseCase::NoiseCancellation,
        UseCase::StudioRecording,
    ];

    /// Value sent in the `use_case` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::ListeningMusic => "listening-music",
            UseCase::Commuting => "commuting",
            UseCase::ProfessionalAudio => "professional-audio",
            UseCase::Gaming => "gaming",
            UseCase::FitnessSports => "fitness-sports",
            UseCase::VideoCalls => "video-calls",
            UseCase::NoiseCancellation => "noise-cancellation",
            UseCase::StudioRecording => "studio-recording",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            UseCase::ListeningMusic => "Listening Music",
            UseCase::Commuting => "Commuting",
            UseCase::ProfessionalAudio => "Professional Audio",
            UseCase::Gaming => "Gaming",
            UseCase::FitnessSports => "Fitness & Sports",
            UseCase::VideoCalls => "Video Calls",
            UseCase::NoiseCancellation => "Noise Cancellation",
            UseCase::StudioRecording => "Studio Recording",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        UseCase::ALL
            .into_iter()
            .find(|use_case| use_case.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownUseCase(s.to_string()))
    }
}

/// A binary image part attached to a multipart request
#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep the image bytes out of log lines.
impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Outbound request for `/recommend`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationRequest {
    pub query: String,
    pub budget_min: Option<Idr>,
    pub budget_max: Option<Idr>,
    pub use_case: Option<UseCase>,
    pub image: Option<ImageUpload>,
}

impl RecommendationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_budget_min(mut self, amount: Idr) -> Self {
        self.budget_min = Some(amount);
        self
    }

    pub fn with_budget_max(mut self, amount: Idr) -> Self {
        self.budget_max = Some(amount);
        self
    }

    pub fn with_use_case(mut self, use_case: UseCase) -> Self {
        self.use_case = Some(use_case);
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Check the request before it is sent.
    ///
    /// Budget amounts are unsigned, so only the ordering of the two bounds
    /// needs checking here. Image size and type limits belong to the server.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if min > max {
                return Err(ValidationError::BudgetRange { min, max });
            }
        }
        Ok(())
    }

    /// Text parts of the multipart body, in wire order.
    ///
    /// Only fields that are set appear. Amounts are plain decimal digits.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("query", self.query.clone())];
        if let Some(min) = self.budget_min {
            fields.push(("budget_min", min.to_string()));
        }
        if let Some(max) = self.budget_max {
            fields.push(("budget_max", max.to_string()));
        }
        if let Some(use_case) = self.use_case {
            fields.push(("use_case", use_case.as_str().to_string()));
        }
        fields
    }
}

/// Outbound request for `/analyze-ear`
#[derive(Debug, Clone, PartialEq)]
pub struct EarAnalysisRequest {
    pub image: ImageUpload,
}

impl EarAnalysisRequest {
    pub fn new(image: ImageUpload) -> Self {
        Self { image }
    }
}

// =============================================================================
// Recommendation Types
// =============================================================================

/// Coarse desirability grade: SS > S > A > B.
///
/// Anything the service sends outside those four grades, including a
/// missing value, becomes `Unrated`. Unrated items display as grade A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TierRating {
    SS,
    S,
    A,
    B,
    #[default]
    Unrated,
}

impl TierRating {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "SS" => TierRating::SS,
            "S" => TierRating::S,
            "A" => TierRating::A,
            "B" => TierRating::B,
            _ => TierRating::Unrated,
        }
    }

    /// Grade used for display; unrated falls back to A
    pub fn effective(&self) -> TierRating {
        match self {
            TierRating::Unrated => TierRating::A,
            other => *other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.effective() {
            TierRating::SS => "SS",
            TierRating::S => "S",
            TierRating::B => "B",
            _ => "A",
        }
    }

    pub fn badge(&self) -> Badge {
        match self.effective() {
            TierRating::SS => Badge::Error,
            TierRating::S => Badge::Warning,
            TierRating::B => Badge::Info,
            _ => Badge::Success,
        }
    }

    pub fn is_rated(&self) -> bool {
        !matches!(self, TierRating::Unrated)
    }
}

impl<'de> Deserialize<'de> for TierRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(TierRating::from_label)
            .unwrap_or(TierRating::Unrated))
    }
}

impl Serialize for TierRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_rated() {
            serializer.serialize_str(self.label())
        } else {
            serializer.serialize_none()
        }
    }
}

/// Marketplaces the service may link to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marketplace {
    Tokopedia,
    Shopee,
    TiktokShop,
}

impl Marketplace {
    pub fn name(&self) -> &'static str {
        match self {
            Marketplace::Tokopedia => "Tokopedia",
            Marketplace::Shopee => "Shopee",
            Marketplace::TiktokShop => "Tiktok Shop",
        }
    }
}

/// Purchase links, one optional URL per marketplace
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseLinks {
    #[serde(rename = "Tokopedia", default, skip_serializing_if = "Option::is_none")]
    pub tokopedia: Option<String>,
    #[serde(rename = "Shopee", default, skip_serializing_if = "Option::is_none")]
    pub shopee: Option<String>,
    #[serde(rename = "Tiktok Shop", default, skip_serializing_if = "Option::is_none")]
    pub tiktok_shop: Option<String>,
}

impl PurchaseLinks {
    pub fn get(&self, marketplace: Marketplace) -> Option<&str> {
        match marketplace {
            Marketplace::Tokopedia => self.tokopedia.as_deref(),
            Marketplace::Shopee => self.shopee.as_deref(),
            Marketplace::TiktokShop => self.tiktok_shop.as_deref(),
        }
    }

    /// Links that are present, in a fixed marketplace order
    pub fn iter(&self) -> impl Iterator<Item = (Marketplace, &str)> {
        [Marketplace::Tokopedia, Marketplace::Shopee, Marketplace::TiktokShop]
            .into_iter()
            .filter_map(move |m| self.get(m).map(|url| (m, url)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One ranked product recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: u32,
    pub brand: String,
    pub model: String,
    pub price: Idr,
    pub key_features: Vec<String>,
    pub why_recommended: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub purchase_links: PurchaseLinks,
    #[serde(default, skip_serializing_if = "tier_is_unrated")]
    pub tier_rating: TierRating,
}

impl Recommendation {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

fn tier_is_unrated(tier: &TierRating) -> bool {
    !tier.is_rated()
}

// =============================================================================
// Response Types
// =============================================================================

/// Body returned by `/recommend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub reasoning: String,
    pub confidence_score: f64,
    pub sources: Vec<String>,
    /// Missing or `null` when no image was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ear_analysis: Option<EarAnalysis>,
    pub has_visual_proof: bool,
}

impl RecommendationResponse {
    /// Check the invariants the service promises.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(ValidationError::OutOfRange {
                field: "confidence_score".to_string(),
                value: self.confidence_score,
            });
        }

        let mut previous = 0;
        for rec in &self.recommendations {
            if rec.rank <= previous {
                return Err(ValidationError::RankOrder {
                    previous,
                    next: rec.rank,
                });
            }
            previous = rec.rank;
        }

        if let Some(analysis) = &self.ear_analysis {
            analysis.validate()?;
        }
        Ok(())
    }

    /// Ear analysis, only when the service vouches for it.
    ///
    /// `has_visual_proof` is the authoritative signal. An `ear_analysis`
    /// object sent alongside `has_visual_proof: false` is ignored.
    pub fn visual_analysis(&self) -> Option<&EarAnalysis> {
        if self.has_visual_proof {
            self.ear_analysis.as_ref()
        } else {
            None
        }
    }

    /// Confidence as a whole percentage, rounded half up
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence_score * 100.0).round() as u32
    }

    pub fn top(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }
}

/// Body returned by `/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up"
        )
    }
}

/// Body returned by `/debug/test-recommendation`; opaque to the client
pub type DebugTestResponse = serde_json::Value;
