use std::{env, time::Duration};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    model::{InvoiceRecord, InvoiceSummary, LocationUpdate, WarehouseLocation},
    ApiError, Backend,
};

pub const DEFAULT_AUTH_HEADER: &str = "X-Auth-Token";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub base_url: String,
    /// Name of the header carrying the session token.
    pub auth_header: String,
    pub timeout_secs: u64,
    pub proxy: Option<String>,
}

impl BackendConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            auth_header: DEFAULT_AUTH_HEADER.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
        }
    }

    pub fn from_env() -> Option<Self> {
        let mut config = Self::new(env::var("BACKEND_URL").ok()?);
        if let Ok(header) = env::var("BACKEND_AUTH_HEADER") {
            config.auth_header = header;
        }
        if let Ok(timeout) = env::var("BACKEND_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().ok()?;
        }
        config.proxy = env::var("BACKEND_PROXY").ok();
        Some(config)
    }
}

pub struct BackendClient {
    pub config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        /* build the http client with timeout and optional proxy */
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(proxy_url) = &config.proxy {
            log::info!("Using proxy '{proxy_url}' for backend requests.");
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            config: config.clone(),
            http: builder.build()?,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Fetch data from an endpoint of the backend.
    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        log::debug!("Requesting endpoint '{endpoint}'.");

        let response = self.http.get(&url).send().await?;

        /* parse response */
        let status_code = response.status();
        if status_code.is_success() {
            Ok(serde_json::from_str(&response.text().await?)?)
        } else {
            Err(ApiError::InvalidResponse {
                status_code,
                url,
                response: response.text().await.ok(),
            })
        }
    }

    /// Send a json body to an endpoint. Any 2xx status counts as success,
    /// the response body is ignored.
    async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        auth_token: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(endpoint);
        log::debug!("Sending to endpoint '{endpoint}'.");

        let response = self
            .http
            .put(&url)
            .header(self.config.auth_header.as_str(), auth_token)
            .json(body)
            .send()
            .await?;

        let status_code = response.status();
        if status_code.is_success() {
            Ok(())
        } else {
            Err(ApiError::InvalidResponse {
                status_code,
                url,
                response: response.text().await.ok(),
            })
        }
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn update_location(
        &self,
        auth_token: &str,
        update: &LocationUpdate,
    ) -> Result<(), ApiError> {
        self.put("api/Location/update", auth_token, update).await
    }

    async fn in_transit_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceRecord>, ApiError> {
        self.get(&format!(
            "api/Invoice/getInTransitInvoicesForDriver/{driver_id}"
        ))
        .await
    }

    async fn approved_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceSummary>, ApiError> {
        self.get(&format!(
            "api/Invoice/GetApprovedInvoicesForDriver/{driver_id}"
        ))
        .await
    }

    async fn warehouse_location(&self) -> Result<WarehouseLocation, ApiError> {
        self.get("api/Warehouses/GetWarehouseLocation").await
    }

    async fn update_invoice_status(
        &self,
        auth_token: &str,
        invoice_id: i32,
        status: i32,
    ) -> Result<(), ApiError> {
        self.put(
            &format!("api/Invoice/UpdateInvoiceStatus/{invoice_id}/status"),
            auth_token,
            &status,
        )
        .await
    }
}
