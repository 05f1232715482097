use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub mod client;
pub mod model;

pub use reqwest::StatusCode;

use crate::model::{DirectionsRequest, DirectionsResponse};

/// An external service computing routes between points.
#[async_trait]
pub trait Directions: Send + Sync {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError>;
}

#[derive(Debug, Clone)]
pub enum DirectionsError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: StatusCode,
        response: Option<String>,
    },
}

impl DirectionsError {
    /// `true` if the service answered but the body could not be understood.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, DirectionsError::JsonError(_))
    }
}

impl error::Error for DirectionsError {}

impl fmt::Display for DirectionsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DirectionsError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            DirectionsError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            DirectionsError::InvalidResponse {
                status_code,
                response,
            } => match response {
                Some(text) => write!(f, "Invalid Response ({}): {}", status_code, text),
                None => write!(f, "Invalid Response ({})", status_code),
            },
        }
    }
}

impl From<reqwest::Error> for DirectionsError {
    fn from(e: reqwest::Error) -> Self {
        DirectionsError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for DirectionsError {
    fn from(e: serde_json::Error) -> Self {
        DirectionsError::JsonError(Arc::new(e))
    }
}
