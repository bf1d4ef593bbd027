//! # Chat Controller
//!
//! Coordinates one chat turn:
//! 1. Record the user's message and build a request from the filters
//! 2. Call the recommendation service
//! 3. Append the answer, or a readable error, to the transcript
//!
//! The controller owns its session and is driven through `&mut self`, so a
//! single controller never has two requests in flight. Separate controllers
//! share nothing but the remote service.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use alma_client::{ClientConfig, RecommendationClient};
use alma_models::{EarAnalysisRequest, EarAnalysisResponse, HealthResponse};

use crate::session::{ChatSession, Message};

pub struct ChatController {
    client: RecommendationClient,
    session: ChatSession,
}

impl ChatController {
    pub fn new(client: RecommendationClient) -> Self {
        Self {
            client,
            session: ChatSession::new(),
        }
    }

    /// Build a controller with a fresh client for `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = RecommendationClient::from_config(config)
            .context("Failed to create recommendation client")?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &RecommendationClient {
        &self.client
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Check the service before starting a chat
    pub async fn check_service(&self) -> Result<HealthResponse> {
        self.client
            .health_check()
            .await
            .with_context(|| format!("Service at {} is not healthy", self.client.base_url()))
    }

    /// Run one chat turn.
    ///
    /// # Returns
    /// The assistant message appended for this turn, or `None` when the
    /// input was blank or a request was already in flight
    pub async fn submit(&mut self, text: &str) -> Option<&Message> {
        let request = self.session.send_message(text)?;

        let start_time = Instant::now();
        let outcome = self.client.get_recommendation(&request).await;
        let elapsed = start_time.elapsed();

        let message = match outcome {
            Ok(response) => {
                info!(
                    "Got {} recommendations in {:.2?}",
                    response.recommendations.len(),
                    elapsed
                );
                self.session.receive_response(response)
            }
            Err(e) => {
                warn!("Recommendation failed after {:.2?}: {}", elapsed, e);
                self.session.receive_error(&e)
            }
        };
        Some(message)
    }

    /// Run the ear analysis on the current photo without asking for products
    pub async fn analyze_ear_photo(&self) -> Result<Option<EarAnalysisResponse>> {
        let Some(photo) = &self.session.filters().ear_photo else {
            return Ok(None);
        };
        let request = EarAnalysisRequest::new(photo.upload().clone());
        let analysis = self
            .client
            .analyze_ear(&request)
            .await
            .with_context(|| format!("Failed to analyze {}", photo.file_name()))?;
        Ok(Some(analysis))
    }
}
