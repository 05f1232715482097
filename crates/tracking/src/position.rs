use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use model::GeoPoint;
use serde::{Deserialize, Serialize};

/// Accuracy tier requested from the platform's location service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Best,
}

impl FromStr for Accuracy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lowest" => Ok(Self::Lowest),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "best" => Ok(Self::Best),
            other => Err(format!("unknown accuracy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    PermissionDenied,
    NotSupported,
    NotEnabled,
    Other(String),
}

impl fmt::Display for FixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FixError::PermissionDenied => write!(f, "permission denied"),
            FixError::NotSupported => write!(f, "location is not supported on this device"),
            FixError::NotEnabled => write!(f, "location is not enabled"),
            FixError::Other(why) => write!(f, "{why}"),
        }
    }
}

impl std::error::Error for FixError {}

/// Source of position fixes, usually the platform's location service.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Acquire one fix. `Ok(None)` means no fix was available within
    /// `timeout`, which is not an error.
    async fn current_position(
        &self,
        accuracy: Accuracy,
        timeout: Duration,
    ) -> Result<Option<GeoPoint>, FixError>;
}

#[async_trait]
impl<P: PositionProvider + ?Sized> PositionProvider for Arc<P> {
    async fn current_position(
        &self,
        accuracy: Accuracy,
        timeout: Duration,
    ) -> Result<Option<GeoPoint>, FixError> {
        (**self).current_position(accuracy, timeout).await
    }
}

/// Always reports the same position. Used for simulated drivers.
pub struct StaticPositionProvider {
    point: GeoPoint,
}

impl StaticPositionProvider {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

#[async_trait]
impl PositionProvider for StaticPositionProvider {
    async fn current_position(
        &self,
        _accuracy: Accuracy,
        _timeout: Duration,
    ) -> Result<Option<GeoPoint>, FixError> {
        Ok(Some(self.point))
    }
}
