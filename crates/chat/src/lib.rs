//! Chat crate for the ALMA audio assistant.
//!
//! This crate holds the application state of a chat (`ChatSession`), the
//! controller that drives the recommendation client from it
//! (`ChatController`), and the ear photo / preview file handling.

pub mod controller;
pub mod photo;
pub mod session;

pub use controller::ChatController;
pub use photo::{EarPhoto, ImagePreview, PhotoError};
pub use session::{
    ChatSession, FilterParams, GREETING, Message, MessageContent, Role, describe_error,
};
