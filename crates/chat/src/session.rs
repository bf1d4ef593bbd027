//! # Chat Session
//!
//! The whole view state of a chat in one struct: the transcript, the filter
//! panel and the in-flight flag. It changes only through the actions below:
//!
//! - `send_message`: user input in, request out
//! - `receive_response` / `receive_error`: close the in-flight request
//! - `reset_filters`, `new_chat` and the filter setters
//!
//! Nothing here performs I/O on the network; `ChatController` pairs the
//! session with a client.

use std::path::Path;

use alma_client::ApiError;
use alma_models::{
    Idr, RecommendationRequest, RecommendationResponse, UseCase, format_budget_range,
};
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::photo::{EarPhoto, ImagePreview, PhotoError};

pub const GREETING: &str = "Hello! I'm ALMA, your audio assistant. Tell me what you need and I'll find earphones that fit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Recommendation(Box<RecommendationResponse>),
    Error { text: String, status: Option<u16> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: MessageContent,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) | MessageContent::Error { text, .. } => Some(text),
            MessageContent::Recommendation(_) => None,
        }
    }

    pub fn recommendation(&self) -> Option<&RecommendationResponse> {
        match &self.content {
            MessageContent::Recommendation(response) => Some(response),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, MessageContent::Error { .. })
    }
}

/// Filter panel values. A budget of 0 means "no bound".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterParams {
    pub min_budget: Idr,
    pub max_budget: Idr,
    pub use_case: UseCase,
    pub ear_photo: Option<EarPhoto>,
}

impl FilterParams {
    pub fn to_request(&self, query: impl Into<String>) -> RecommendationRequest {
        RecommendationRequest {
            query: query.into(),
            budget_min: (self.min_budget > 0).then_some(self.min_budget),
            budget_max: (self.max_budget > 0).then_some(self.max_budget),
            use_case: Some(self.use_case),
            image: self.ear_photo.as_ref().map(|photo| photo.upload().clone()),
        }
    }

    /// One-line summary for headers and status bars
    pub fn summary(&self) -> String {
        format!(
            "Budget: {} | Use case: {} | Ear photo: {}",
            format_budget_range(self.min_budget, self.max_budget),
            self.use_case.label(),
            if self.ear_photo.is_some() { "uploaded" } else { "not uploaded" }
        )
    }
}

/// Map a failed call to something a user can act on
pub fn describe_error(err: &ApiError) -> String {
    match err {
        ApiError::InvalidRequest(e) => format!("Please check your input: {}.", e),
        ApiError::Transport(_) => {
            "I couldn't reach the recommendation service. Please try again later.".to_string()
        }
        ApiError::Http { status, .. } => match status {
            400 | 422 => {
                "The service couldn't use that request. Please check your input and try again."
                    .to_string()
            }
            500..=599 => {
                "The recommendation service ran into a problem. Please try again later."
                    .to_string()
            }
            other => format!("The request failed with status {}.", other),
        },
        ApiError::Decode(_) | ApiError::Contract(_) => {
            "The service sent an answer I couldn't read. Please try again later.".to_string()
        }
    }
}

pub struct ChatSession {
    messages: Vec<Message>,
    filters: FilterParams,
    is_loading: bool,
    next_id: u64,
    photo_preview: Option<ImagePreview>,
    annotated_preview: Option<ImagePreview>,
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self {
            messages: Vec::new(),
            filters: FilterParams::default(),
            is_loading: false,
            next_id: 1,
            photo_preview: None,
            annotated_preview: None,
        };
        session.push(Role::Assistant, MessageContent::Text(GREETING.to_string()));
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn push(&mut self, role: Role, content: MessageContent) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            timestamp: Local::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Record the user's message and build the request for it.
    ///
    /// Returns `None` for blank input or while a request is in flight.
    pub fn send_message(&mut self, text: &str) -> Option<RecommendationRequest> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_loading {
            warn!("Ignoring message while a request is in flight");
            return None;
        }

        let request = self.filters.to_request(text.trim());
        self.push(Role::User, MessageContent::Text(text.to_string()));
        self.is_loading = true;
        debug!("Built request from filters: {:?}", request);
        Some(request)
    }

    pub fn receive_response(&mut self, response: RecommendationResponse) -> &Message {
        if !self.is_loading {
            warn!("Received a response with no request in flight");
        }
        self.is_loading = false;
        // A new answer supersedes the previous annotated image.
        self.annotated_preview = None;
        info!(
            "Appending {} recommendations to transcript",
            response.recommendations.len()
        );
        self.push(
            Role::Assistant,
            MessageContent::Recommendation(Box::new(response)),
        )
    }

    pub fn receive_error(&mut self, err: &ApiError) -> &Message {
        if !self.is_loading {
            warn!("Received an error with no request in flight");
        }
        self.is_loading = false;
        let text = describe_error(err);
        self.push(
            Role::Assistant,
            MessageContent::Error {
                text,
                status: err.status(),
            },
        )
    }

    /// Back to default filters; the ear photo and its preview are released
    pub fn reset_filters(&mut self) {
        self.photo_preview = None;
        self.filters = FilterParams::default();
        info!("Filters reset to defaults");
    }

    /// Start over with only the greeting. Filters are kept.
    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.annotated_preview = None;
        self.is_loading = false;
        self.push(Role::Assistant, MessageContent::Text(GREETING.to_string()));
    }

    pub fn set_min_budget(&mut self, amount: Idr) {
        self.filters.min_budget = amount;
    }

    pub fn set_max_budget(&mut self, amount: Idr) {
        self.filters.max_budget = amount;
    }

    pub fn set_use_case(&mut self, use_case: UseCase) {
        self.filters.use_case = use_case;
    }

    /// Replace the ear photo. Any preview of the old photo is released.
    pub fn set_ear_photo(&mut self, photo: Option<EarPhoto>) {
        self.photo_preview = None;
        self.filters.ear_photo = photo;
    }

    // =========================================================================
    // Previews
    // =========================================================================

    /// Preview file for the current ear photo, created on first use
    pub fn ear_photo_preview(&mut self) -> Result<Option<&Path>, PhotoError> {
        let Some(photo) = &self.filters.ear_photo else {
            return Ok(None);
        };
        if self.photo_preview.is_none() {
            self.photo_preview = Some(photo.preview()?);
        }
        Ok(self.photo_preview.as_ref().map(ImagePreview::path))
    }

    /// Preview file for the annotated image of the latest answer.
    ///
    /// `None` when the latest answer has no visual proof or only the
    /// placeholder image.
    pub fn annotated_image_preview(&mut self) -> Result<Option<&Path>, PhotoError> {
        if self.annotated_preview.is_none() {
            let image = self
                .messages
                .iter()
                .rev()
                .find_map(Message::recommendation)
                .and_then(RecommendationResponse::visual_analysis)
                .map(|analysis| &analysis.annotated_image);

            let bytes = match image.filter(|image| image.is_available()) {
                Some(image) => match image.decode() {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Annotated image could not be decoded: {}", e);
                        return Ok(None);
                    }
                },
                None => return Ok(None),
            };
            self.annotated_preview = Some(ImagePreview::create(&bytes, "jpg")?);
        }
        Ok(self.annotated_preview.as_ref().map(ImagePreview::path))
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
