//! In-memory collaborators for tests.

use std::{
    future,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use backend::{
    model::{InvoiceRecord, InvoiceSummary, LocationUpdate, WarehouseLocation},
    ApiError, Backend,
};
use directions::{
    model::{DirectionsRequest, DirectionsResponse},
    Directions, DirectionsError,
};
use model::GeoPoint;
use tokio::sync::Notify;

use crate::position::{Accuracy, FixError, PositionProvider};

pub fn invoice(id: i32, name: &str, latitude: f64, longitude: f64) -> InvoiceRecord {
    InvoiceRecord {
        id_invoice: id,
        store_name: name.to_owned(),
        store_latitude: latitude,
        store_longitude: longitude,
        id_driver: None,
        id_status: None,
        warehouse_name: None,
        issue_date: None,
    }
}

pub struct FakeBackend {
    offline: AtomicBool,
    push_attempts: AtomicUsize,
    pushes: Mutex<Vec<(String, LocationUpdate)>>,
    invoices: Mutex<Vec<InvoiceRecord>>,
    collect_requests: Mutex<Vec<i32>>,
    status_updates: Mutex<Vec<(i32, i32)>>,
    warehouse: GeoPoint,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            offline: AtomicBool::new(false),
            push_attempts: AtomicUsize::new(0),
            pushes: Mutex::default(),
            invoices: Mutex::default(),
            collect_requests: Mutex::default(),
            status_updates: Mutex::default(),
            warehouse: GeoPoint::new(43.8, 18.3),
        }
    }
}

impl FakeBackend {
    pub fn with_invoices(invoices: Vec<InvoiceRecord>) -> Self {
        let backend = Self::default();
        *backend.invoices.lock().unwrap() = invoices;
        backend
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_invoices(&self, invoices: Vec<InvoiceRecord>) {
        *self.invoices.lock().unwrap() = invoices;
    }

    pub fn pushes(&self) -> Vec<(String, LocationUpdate)> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn push_attempts(&self) -> usize {
        self.push_attempts.load(Ordering::SeqCst)
    }

    pub fn collect_requests(&self) -> Vec<i32> {
        self.collect_requests.lock().unwrap().clone()
    }

    pub fn status_updates(&self) -> Vec<(i32, i32)> {
        self.status_updates.lock().unwrap().clone()
    }

    pub fn warehouse(&self) -> GeoPoint {
        self.warehouse
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ApiError::Other("backend offline".to_owned()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn update_location(
        &self,
        auth_token: &str,
        update: &LocationUpdate,
    ) -> Result<(), ApiError> {
        self.push_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.pushes
            .lock()
            .unwrap()
            .push((auth_token.to_owned(), *update));
        Ok(())
    }

    async fn in_transit_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceRecord>, ApiError> {
        self.collect_requests.lock().unwrap().push(driver_id);
        self.check_online()?;
        Ok(self.invoices.lock().unwrap().clone())
    }

    async fn approved_invoices(
        &self,
        driver_id: i32,
    ) -> Result<Vec<InvoiceSummary>, ApiError> {
        self.check_online()?;
        Ok(vec![InvoiceSummary {
            id_invoice: 100,
            id_driver: Some(driver_id),
            id_status: 2,
            store_name: "Approved Store".to_owned(),
            warehouse_name: None,
            issue_date: None,
        }])
    }

    async fn warehouse_location(&self) -> Result<WarehouseLocation, ApiError> {
        self.check_online()?;
        Ok(WarehouseLocation {
            latitude: self.warehouse.latitude,
            longitude: self.warehouse.longitude,
            address: Some("Depot".to_owned()),
        })
    }

    async fn update_invoice_status(
        &self,
        _auth_token: &str,
        invoice_id: i32,
        status: i32,
    ) -> Result<(), ApiError> {
        self.check_online()?;
        self.status_updates.lock().unwrap().push((invoice_id, status));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Fix {
    At(GeoPoint),
    Nothing,
    Fail(FixError),
    Hang,
    Panic,
}

/// Answers every fix request the same way and counts the requests.
pub struct ScriptedPosition {
    fix: Fix,
    calls: AtomicUsize,
    started: Notify,
}

impl ScriptedPosition {
    pub fn new(fix: Fix) -> Self {
        Self {
            fix,
            calls: AtomicUsize::new(0),
            started: Notify::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolves once a fix request has started.
    pub async fn started(&self) {
        self.started.notified().await
    }
}

#[async_trait]
impl PositionProvider for ScriptedPosition {
    async fn current_position(
        &self,
        _accuracy: Accuracy,
        _timeout: Duration,
    ) -> Result<Option<GeoPoint>, FixError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        match &self.fix {
            Fix::At(point) => Ok(Some(*point)),
            Fix::Nothing => Ok(None),
            Fix::Fail(why) => Err(why.clone()),
            Fix::Hang => future::pending().await,
            Fix::Panic => panic!("position provider crashed"),
        }
    }
}

pub struct FakeDirections {
    response: Result<DirectionsResponse, DirectionsError>,
    requests: Mutex<Vec<DirectionsRequest>>,
}

impl FakeDirections {
    pub fn new(response: Result<DirectionsResponse, DirectionsError>) -> Self {
        Self {
            response,
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Directions for FakeDirections {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

/// Polls `condition` until it holds, panics after five seconds.
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
