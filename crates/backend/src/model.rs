use chrono::NaiveDateTime;
use model::{stop::DeliveryStop, GeoPoint};
use serde::{Deserialize, Serialize};

/// Body of `PUT /api/Location/update`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LocationUpdate {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// An in-transit invoice together with the store it goes to.
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceRecord {
    pub id_invoice: i32,
    pub store_name: String,
    pub store_latitude: f64,
    pub store_longitude: f64,
    pub id_driver: Option<i32>,
    pub id_status: Option<i32>,
    pub warehouse_name: Option<String>,
    // the backend is not consistent about offsets, unknown formats are dropped
    #[serde_as(deserialize_as = "serde_with::DefaultOnError")]
    #[serde(default)]
    pub issue_date: Option<NaiveDateTime>,
}

impl From<InvoiceRecord> for DeliveryStop {
    fn from(record: InvoiceRecord) -> Self {
        DeliveryStop {
            invoice_id: record.id_invoice,
            display_name: record.store_name,
            location: GeoPoint::new(record.store_latitude, record.store_longitude),
            warehouse_name: record.warehouse_name,
            issue_date: record.issue_date,
        }
    }
}

/// An approved invoice. These carry no store coordinates yet.
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceSummary {
    pub id_invoice: i32,
    pub id_driver: Option<i32>,
    pub id_status: i32,
    pub store_name: String,
    pub warehouse_name: Option<String>,
    #[serde_as(deserialize_as = "serde_with::DefaultOnError")]
    #[serde(default)]
    pub issue_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WarehouseLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl WarehouseLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
