//! Shortcuts that pre-fill the use case and budget for common situations.
//!
//! These only build a `RecommendationRequest` and forward it to
//! `RecommendationClient::get_recommendation`.

use std::fmt;
use std::str::FromStr;

use alma_models::{
    Idr, ImageUpload, RecommendationRequest, RecommendationResponse, UseCase, ValidationError,
};

use crate::{ApiError, RecommendationClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Gaming,
    Fitness,
    Travel,
    Office,
    Audiophile,
    Commuting,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Gaming,
        Scenario::Fitness,
        Scenario::Travel,
        Scenario::Office,
        Scenario::Audiophile,
        Scenario::Commuting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Gaming => "gaming",
            Scenario::Fitness => "fitness",
            Scenario::Travel => "travel",
            Scenario::Office => "office",
            Scenario::Audiophile => "audiophile",
            Scenario::Commuting => "commuting",
        }
    }

    pub fn use_case(&self) -> UseCase {
        match self {
            Scenario::Gaming => UseCase::Gaming,
            Scenario::Fitness => UseCase::FitnessSports,
            Scenario::Travel => UseCase::NoiseCancellation,
            Scenario::Office => UseCase::VideoCalls,
            Scenario::Audiophile => UseCase::ProfessionalAudio,
            Scenario::Commuting => UseCase::Commuting,
        }
    }

    /// Default `(min, max)` budget in IDR
    pub fn default_budget(&self) -> (Option<Idr>, Idr) {
        match self {
            Scenario::Gaming => (None, 3_000_000),
            Scenario::Fitness => (Some(800_000), 2_500_000),
            Scenario::Travel => (Some(2_000_000), 5_000_000),
            Scenario::Office => (None, 3_500_000),
            Scenario::Audiophile => (Some(1_500_000), 4_000_000),
            Scenario::Commuting => (None, 2_000_000),
        }
    }

    pub fn request(&self, query: impl Into<String>) -> RecommendationRequest {
        self.request_with_budget(query, None, None)
    }

    /// Like `request`, with either bound replacing the preset one
    pub fn request_with_budget(
        &self,
        query: impl Into<String>,
        budget_min: Option<Idr>,
        budget_max: Option<Idr>,
    ) -> RecommendationRequest {
        let (default_min, default_max) = self.default_budget();
        RecommendationRequest {
            query: query.into(),
            budget_min: budget_min.or(default_min),
            budget_max: Some(budget_max.unwrap_or(default_max)),
            use_case: Some(self.use_case()),
            image: None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| ValidationError::UnknownUseCase(s.to_string()))
    }
}

impl RecommendationClient {
    /// Preset use case and budget; `None` bounds keep the preset value
    pub async fn get_scenario_recommendation(
        &self,
        scenario: Scenario,
        query: impl Into<String>,
        budget_min: Option<Idr>,
        budget_max: Option<Idr>,
    ) -> Result<RecommendationResponse, ApiError> {
        let request = scenario.request_with_budget(query, budget_min, budget_max);
        self.get_recommendation(&request).await
    }

    /// Query with an optional upper budget and nothing else
    pub async fn get_basic_recommendation(
        &self,
        query: impl Into<String>,
        budget_max: Option<Idr>,
        use_case: Option<UseCase>,
    ) -> Result<RecommendationResponse, ApiError> {
        let request = RecommendationRequest {
            query: query.into(),
            budget_max,
            use_case,
            ..Default::default()
        };
        self.get_recommendation(&request).await
    }

    pub async fn get_recommendation_with_budget(
        &self,
        query: impl Into<String>,
        budget_min: Idr,
        budget_max: Idr,
        use_case: Option<UseCase>,
    ) -> Result<RecommendationResponse, ApiError> {
        let request = RecommendationRequest {
            query: query.into(),
            budget_min: Some(budget_min),
            budget_max: Some(budget_max),
            use_case,
            image: None,
        };
        self.get_recommendation(&request).await
    }

    pub async fn get_recommendation_with_image(
        &self,
        query: impl Into<String>,
        image: ImageUpload,
        budget_max: Option<Idr>,
        use_case: Option<UseCase>,
    ) -> Result<RecommendationResponse, ApiError> {
        let request = RecommendationRequest {
            query: query.into(),
            budget_max,
            use_case,
            image: Some(image),
            ..Default::default()
        };
        self.get_recommendation(&request).await
    }
}
