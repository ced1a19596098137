//! Typed client for the kanban REST API.
//!
//! Mirrors the per-entity verticals of the backend: an entity service for the
//! REST calls, a form adapter converting between persisted records and
//! editable drafts, and list/update controllers driving view state. The
//! controllers never own navigation; they emit query parameters and re-derive
//! their state when the host navigates, so the URL stays the source of truth.

mod collection;
mod form;
mod list;
mod resolve;
mod service;
mod update;

pub use collection::*;
pub use form::*;
pub use list::*;
pub use resolve::*;
pub use service::*;
pub use update::*;

/// Client-side error type.
#[derive(Debug)]
pub enum ClientError {
    /// The backend returned no entity for the identifier
    NotFound,
    /// An update or partial update was attempted without an identifier
    MissingIdentifier,
    /// Transport-level failure
    Http(String),
    /// Non-success response from the backend
    Status { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotFound => write!(f, "entity not found"),
            ClientError::MissingIdentifier => write!(f, "entity has no identifier"),
            ClientError::Http(msg) => write!(f, "http error: {}", msg),
            ClientError::Status { status, message } => {
                write!(f, "unexpected status {}: {}", status, message)
            }
            ClientError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}
