use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// One position fix taken by the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub point: GeoPoint,
    pub captured_at: DateTime<Local>,
}

impl LocationSample {
    pub fn new(point: GeoPoint, captured_at: DateTime<Local>) -> Self {
        Self { point, captured_at }
    }

    /// Creates a sample captured right now.
    pub fn now(point: GeoPoint) -> Self {
        Self::new(point, chrono::offset::Local::now())
    }
}
