use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A store the driver still has to deliver an invoice to.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStop {
    pub invoice_id: i32,
    pub display_name: String,
    pub location: GeoPoint,
    pub warehouse_name: Option<String>,
    pub issue_date: Option<NaiveDateTime>,
}

impl DeliveryStop {
    pub fn new<S: Into<String>>(
        invoice_id: i32,
        display_name: S,
        location: GeoPoint,
    ) -> Self {
        Self {
            invoice_id,
            display_name: display_name.into(),
            location,
            warehouse_name: None,
            issue_date: None,
        }
    }
}
