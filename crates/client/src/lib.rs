//! HTTP client for the ALMA recommendation service.
//!
//! This crate provides a Rust client to call the recommendation service
//! over plain HTTP. It handles:
//! - Encoding requests as multipart form bodies
//! - Decoding JSON responses into the `alma-models` types
//! - Turning non-2xx answers into `ApiError::Http` with the raw body kept
//!
//! Each call is a single attempt. There is no retry, no backoff and no
//! cancellation; a failed call is reported to the caller as is.

pub mod config;
pub mod error;
pub mod scenarios;

use std::fmt::Display;

use alma_models::{
    DebugTestResponse, EarAnalysisRequest, EarAnalysisResponse, HealthResponse, ImageUpload,
    RecommendationRequest, RecommendationResponse, ValidationError,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use scenarios::Scenario;

/// Client for the recommendation service.
///
/// Cloning is cheap; clones share one connection pool. The client holds no
/// other state, so concurrent calls are independent of each other.
#[derive(Debug, Clone)]
pub struct RecommendationClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecommendationClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Service root (e.g., "http://localhost:8000")
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        info!("Recommendation client targeting {}", config.base_url);
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Get the service root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the service is up.
    pub async fn health_check(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("/health");
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!("Health check could not reach {}: {}", url, e);
            ApiError::Transport(e)
        })?;
        decode_json(response, "Health check failed").await
    }

    /// Ask for ranked product recommendations.
    ///
    /// # Arguments
    /// * `request` - Query, budget bounds, use case and an optional ear photo
    ///
    /// # Returns
    /// The decoded response, checked against the documented invariants
    pub async fn get_recommendation(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ApiError> {
        request.validate()?;

        let url = self.endpoint("/recommend");
        info!(
            budget_min = ?request.budget_min,
            budget_max = ?request.budget_max,
            use_case = ?request.use_case.map(|u| u.as_str()),
            with_image = request.image.is_some(),
            "POST {}",
            url
        );

        let form = build_recommendation_form(request)?;
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Recommendation request could not reach {}: {}", url, e);
                ApiError::Transport(e)
            })?;

        let recommendation: RecommendationResponse =
            decode_json(response, "Recommendation request failed").await?;
        recommendation.validate().map_err(|e| {
            error!("Recommendation response rejected: {}", e);
            ApiError::Contract(e)
        })?;

        info!(
            "Received {} recommendations (confidence {:.2}, visual proof: {})",
            recommendation.recommendations.len(),
            recommendation.confidence_score,
            recommendation.has_visual_proof
        );
        Ok(recommendation)
    }

    /// Run the ear analysis on its own.
    pub async fn analyze_ear(
        &self,
        request: &EarAnalysisRequest,
    ) -> Result<EarAnalysisResponse, ApiError> {
        let url = self.endpoint("/analyze-ear");
        info!("POST {} ({} byte image)", url, request.image.len());

        let form = Form::new().part("image", image_part(&request.image)?);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Ear analysis request could not reach {}: {}", url, e);
                ApiError::Transport(e)
            })?;

        let analysis: EarAnalysisResponse =
            decode_json(response, "Ear analysis request failed").await?;
        analysis.validate().map_err(ApiError::Contract)?;

        info!(
            "Ear analysis: size {} with {} fit matches",
            analysis.measurements.size_category,
            analysis.recommendations.len()
        );
        Ok(analysis)
    }

    /// Fetch the service's canned diagnostic recommendation.
    pub async fn debug_test_recommendation(&self) -> Result<DebugTestResponse, ApiError> {
        let url = self.endpoint("/debug/test-recommendation");
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        decode_json(response, "Debug test failed").await
    }
}

/// Build the multipart body for `/recommend`.
///
/// Text parts come from `RecommendationRequest::form_fields`, so unset
/// optional fields never appear on the wire.
fn build_recommendation_form(request: &RecommendationRequest) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in request.form_fields() {
        form = form.text(name, value);
    }
    if let Some(image) = &request.image {
        form = form.part("image", image_part(image)?);
    }
    Ok(form)
}

fn image_part(image: &ImageUpload) -> Result<Part, ApiError> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime_type)
        .map_err(|_| ValidationError::UnsupportedImage(image.mime_type.clone()).into())
}

/// Turn a response into `T`, or into the matching `ApiError`.
///
/// Non-2xx: the body is read as text and kept on the error. 2xx: the body
/// must decode completely; nothing is defaulted.
async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    failure: impl Display,
) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.ok().filter(|b| !b.is_empty());
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        error!(
            status = status.as_u16(),
            body = body.as_deref().unwrap_or(""),
            "{}: {}",
            failure,
            reason
        );
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: format!("{}: {}", failure, reason),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        error!("Could not decode response body ({} bytes): {}", body.len(), e);
        ApiError::Decode(e)
    })
}
