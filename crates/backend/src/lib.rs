use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub mod client;
pub mod model;

use crate::model::{InvoiceRecord, InvoiceSummary, LocationUpdate, WarehouseLocation};

/// Status id the backend uses for delivered invoices.
pub const STATUS_DELIVERED: i32 = 5;

/// The delivery backend as seen from the driver's device.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stores the driver's current position. `auth_token` identifies the driver.
    async fn update_location(
        &self,
        auth_token: &str,
        update: &LocationUpdate,
    ) -> Result<(), ApiError>;

    /// Invoices currently loaded on the driver's vehicle, in backend order.
    async fn in_transit_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceRecord>, ApiError>;

    /// Invoices approved for the driver but not yet picked up.
    async fn approved_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceSummary>, ApiError>;

    async fn warehouse_location(&self) -> Result<WarehouseLocation, ApiError>;

    async fn update_invoice_status(
        &self,
        auth_token: &str,
        invoice_id: i32,
        status: i32,
    ) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}
