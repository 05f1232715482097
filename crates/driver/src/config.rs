use std::env;

use backend::client::BackendConfig;
use directions::client::DirectionsCredentials;
use model::{session::Session, GeoPoint};
use tracking::config::TrackerConfig;

pub struct DriverConfig {
    pub backend: BackendConfig,
    /// Only needed for route optimization.
    pub directions: Option<DirectionsCredentials>,
    pub tracker: TrackerConfig,
    /// Seeds the credential store, normally written by the login screen.
    pub session: Option<Session>,
    /// Position reported by the simulated location service.
    pub position: GeoPoint,
}

impl DriverConfig {
    pub fn from_env() -> Option<Self> {
        let backend = BackendConfig::from_env()?;
        let tracker = TrackerConfig::from_env()?;
        let latitude: f64 = env::var("DRIVER_LATITUDE").ok()?.parse().ok()?;
        let longitude: f64 = env::var("DRIVER_LONGITUDE").ok()?.parse().ok()?;

        let session = match (env::var("DRIVER_TOKEN"), env::var("DRIVER_ID")) {
            (Ok(token), Ok(driver_id)) => Some(Session::new(token, driver_id.parse().ok()?)),
            _ => None,
        };

        Some(Self {
            backend,
            directions: DirectionsCredentials::from_env(),
            tracker,
            session,
            position: GeoPoint::new(latitude, longitude),
        })
    }
}
