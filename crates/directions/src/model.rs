use itertools::Itertools;
use model::GeoPoint;
use serde::{Deserialize, Serialize};

/// Parameters of a single directions query.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    /// Let the service reorder `waypoints` for the shortest route.
    pub optimize: bool,
}

impl DirectionsRequest {
    /// Query parameters without the api key.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", self.origin.to_string()),
            ("destination", self.destination.to_string()),
        ];
        if !self.waypoints.is_empty() {
            let prefix = self.optimize.then(|| "optimize:true".to_owned());
            let waypoints = prefix
                .into_iter()
                .chain(self.waypoints.iter().map(GeoPoint::to_string))
                .join("|");
            query.push(("waypoints", waypoints));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<Leg>,
    /// Visiting order of the request's waypoints, if they were optimized.
    #[serde(default)]
    pub waypoint_order: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub polyline: EncodedPolyline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}
