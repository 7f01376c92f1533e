pub mod api;
pub mod search;
pub mod session;

pub use api::{AuthApi, FlightApi, TicketApi};
pub use search::{DateRange, PageRequest, SearchQuery};
pub use session::{MemoryTokenStore, SessionContext, SessionError, TokenHandle, TokenStore};

const NETWORK_MESSAGE: &str = "We couldn't reach the server. Please check your connection and try again.";
const REJECTED_MESSAGE: &str = "The request was rejected. Please review your details and try again.";
const SERVER_MESSAGE: &str = "Something went wrong on our side. Please try again.";
const LOGIN_MESSAGE: &str = "Please log in to continue.";

/// Failure talking to the remote airline API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Server error ({status})")]
    Server { status: u16 },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text safe to show to the traveller. Server-provided rejection reasons are passed
    /// through; everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Timeout(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Unauthorized => LOGIN_MESSAGE.to_string(),
            ApiError::Rejected { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            ApiError::Rejected { .. } => REJECTED_MESSAGE.to_string(),
            ApiError::Server { .. } | ApiError::Decode(_) => SERVER_MESSAGE.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::Server { .. }
        )
    }
}

/// Local, field-scoped input error. Never involves a network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }

    /// "Please fill in the first name" style message for a blank required field
    pub fn missing(field: &'static str) -> Self {
        Self::new(field, format!("Please fill in the {}", field.replace('_', " ")))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
