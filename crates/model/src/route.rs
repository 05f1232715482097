use serde::{Deserialize, Serialize};

use crate::{stop::DeliveryStop, GeoPoint};

/// Input of a route optimization: start at `origin`, visit all `stops` in an
/// order chosen by the directions service, end at `destination`.
///
/// `stops` keeps the order the backend returned them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointPlan {
    pub origin: GeoPoint,
    pub stops: Vec<DeliveryStop>,
    pub destination: GeoPoint,
}

impl WaypointPlan {
    pub fn new(
        origin: GeoPoint,
        stops: Vec<DeliveryStop>,
        destination: GeoPoint,
    ) -> Self {
        Self {
            origin,
            stops,
            destination,
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.stops.iter().map(|stop| stop.location)
    }
}

/// Geographic path of a route in traversal order.
///
/// Adjacent points may be equal where two steps of the route meet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<GeoPoint>,
}

impl RoutePath {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn extend<I: IntoIterator<Item = GeoPoint>>(&mut self, points: I) {
        self.points.extend(points);
    }

    /// Length of the path along its points in kilometers.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_km(&pair[1]))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    pub path: RoutePath,
    /// Stops in the visiting order chosen by the directions service.
    pub stops: Vec<DeliveryStop>,
    /// Set if at least one encoded step could only be decoded partially.
    pub truncated: bool,
}
