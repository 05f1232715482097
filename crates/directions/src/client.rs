use std::{env, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    model::{DirectionsRequest, DirectionsResponse},
    Directions, DirectionsError,
};

pub const DIRECTIONS_API_URL: &str = "https://maps.googleapis.com/maps/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsCredentials {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub proxy: Option<String>,
}

impl DirectionsCredentials {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DIRECTIONS_API_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
        }
    }

    pub fn from_env() -> Option<Self> {
        let mut credentials = Self::new(env::var("DIRECTIONS_API_KEY").ok()?);
        if let Ok(url) = env::var("DIRECTIONS_URL") {
            credentials.base_url = url;
        }
        credentials.proxy = env::var("DIRECTIONS_PROXY").ok();
        Some(credentials)
    }
}

pub struct DirectionsClient {
    pub credentials: DirectionsCredentials,
    http: reqwest::Client,
}

impl DirectionsClient {
    pub fn new(credentials: &DirectionsCredentials) -> Result<Self, DirectionsError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(credentials.timeout_secs));
        if let Some(proxy_url) = &credentials.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            credentials: credentials.clone(),
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl Directions for DirectionsClient {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let url = format!(
            "{}/directions/json",
            self.credentials.base_url.trim_end_matches('/')
        );
        log::debug!(
            "Requesting directions with {} waypoints.",
            request.waypoints.len()
        );

        let response = self
            .http
            .get(&url)
            .query(&request.query())
            .query(&[("key", self.credentials.api_key.as_str())])
            .send()
            .await?;

        let status_code = response.status();
        if !status_code.is_success() {
            return Err(DirectionsError::InvalidResponse {
                status_code,
                response: response.text().await.ok(),
            });
        }

        let response: DirectionsResponse = serde_json::from_str(&response.text().await?)?;
        if let Some(status) = &response.status {
            log::debug!("Directions service answered with status {status}.");
        }
        Ok(response)
    }
}
