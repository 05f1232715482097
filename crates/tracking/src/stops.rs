use std::sync::Arc;

use backend::{model::InvoiceSummary, Backend, STATUS_DELIVERED};
use model::{session::Session, stop::DeliveryStop, GeoPoint};
use tokio::sync::watch;

use crate::TrackingError;

pub type StopList = Arc<Vec<DeliveryStop>>;

/// Loads the driver's pending stops and keeps the latest list as a snapshot.
///
/// The snapshot is only ever replaced as a whole, readers never see a
/// partially updated list. Stops keep the order the backend returned them in,
/// reordering is left to the directions service.
pub struct StopCollector<B: Backend> {
    backend: Arc<B>,
    snapshot: watch::Sender<StopList>,
}

impl<B: Backend> StopCollector<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (snapshot, _) = watch::channel(StopList::default());
        Self { backend, snapshot }
    }

    pub async fn collect(&self, driver_id: i32) -> Result<Vec<DeliveryStop>, TrackingError> {
        let invoices = self.backend.in_transit_invoices(driver_id).await?;
        Ok(invoices.into_iter().map(DeliveryStop::from).collect())
    }

    pub async fn warehouse(&self) -> Result<GeoPoint, TrackingError> {
        Ok(self.backend.warehouse_location().await?.point())
    }

    /// Collects the stops and publishes them as the new snapshot. On failure
    /// the previous snapshot stays in place.
    pub async fn refresh(&self, driver_id: i32) -> Result<StopList, TrackingError> {
        let stops = Arc::new(self.collect(driver_id).await?);
        let previous = self.snapshot.send_replace(stops.clone());
        if previous.len() != stops.len() {
            log::info!("{} pending stops (was {}).", stops.len(), previous.len());
        }
        Ok(stops)
    }

    pub fn snapshot(&self) -> StopList {
        self.snapshot.borrow().clone()
    }

    /// Notifies about every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StopList> {
        self.snapshot.subscribe()
    }

    /// Invoices approved for the driver that are not yet on the vehicle.
    pub async fn approved(&self, driver_id: i32) -> Result<Vec<InvoiceSummary>, TrackingError> {
        Ok(self.backend.approved_invoices(driver_id).await?)
    }

    /// Reports the invoice as delivered and drops it from the snapshot.
    pub async fn mark_delivered(
        &self,
        session: Option<&Session>,
        invoice_id: i32,
    ) -> Result<(), TrackingError> {
        let session = session
            .filter(|session| session.is_authenticated())
            .ok_or(TrackingError::AuthMissing)?;
        self.backend
            .update_invoice_status(&session.auth_token, invoice_id, STATUS_DELIVERED)
            .await?;

        // filters whatever snapshot is current, a concurrent refresh is kept
        self.snapshot.send_modify(|stops| {
            *stops = Arc::new(
                stops
                    .iter()
                    .filter(|stop| stop.invoice_id != invoice_id)
                    .cloned()
                    .collect(),
            );
        });
        Ok(())
    }
}
