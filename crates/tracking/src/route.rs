use backend::Backend;
use directions::{model::DirectionsRequest, Directions};
use model::{
    route::{OptimizedRoute, RoutePath, WaypointPlan},
    session::Session,
    stop::DeliveryStop,
    GeoPoint,
};
use utility::polyline;

use crate::{stops::StopCollector, TrackingError};

/// Asks the directions service for the best order of the pending stops and
/// decodes the resulting path.
pub struct RouteOptimizer<D: Directions> {
    directions: D,
}

impl<D: Directions> RouteOptimizer<D> {
    pub fn new(directions: D) -> Self {
        Self { directions }
    }

    /// Only the first route of the response is used, alternatives are
    /// ignored. Step paths are appended as they are, so the point where two
    /// steps meet usually shows up twice.
    pub async fn optimize(&self, plan: &WaypointPlan) -> Result<OptimizedRoute, TrackingError> {
        let request = DirectionsRequest {
            origin: plan.origin,
            destination: plan.destination,
            waypoints: plan.waypoints().collect(),
            optimize: true,
        };
        let response = self.directions.directions(&request).await?;

        let Some(route) = response.routes.into_iter().next() else {
            log::info!(
                "Directions service returned no route (status {}).",
                response.status.as_deref().unwrap_or("unknown")
            );
            return Err(TrackingError::NoRoute);
        };

        let mut path = RoutePath::default();
        let mut truncated = false;
        for step in route.legs.iter().flat_map(|leg| leg.steps.iter()) {
            let decoded = polyline::decode(&step.polyline.points);
            if decoded.truncated {
                log::warn!(
                    "Step polyline truncated after {} points.",
                    decoded.points.len()
                );
                truncated = true;
            }
            path.extend(decoded.points);
        }

        if path.is_empty() {
            log::info!("First route has no path.");
            return Err(TrackingError::NoRoute);
        }

        log::debug!(
            "Route with {} points over {:.1} km.",
            path.len(),
            path.length_km()
        );
        Ok(OptimizedRoute {
            path,
            stops: visiting_order(&plan.stops, &route.waypoint_order),
            truncated,
        })
    }

    /// Builds a plan from the latest stop snapshot to the warehouse.
    pub async fn plan<B: Backend>(
        &self,
        origin: GeoPoint,
        stops: &StopCollector<B>,
    ) -> Result<WaypointPlan, TrackingError> {
        let destination = stops.warehouse().await?;
        Ok(WaypointPlan::new(
            origin,
            stops.snapshot().to_vec(),
            destination,
        ))
    }

    /// Refreshes the stops of the signed in driver and optimizes a route from
    /// `origin` through all of them. If the refresh fails the previous
    /// snapshot is used.
    pub async fn optimize_from<B: Backend>(
        &self,
        session: Option<&Session>,
        origin: GeoPoint,
        stops: &StopCollector<B>,
    ) -> Result<OptimizedRoute, TrackingError> {
        let session = session
            .filter(|session| session.is_authenticated())
            .ok_or(TrackingError::AuthMissing)?;
        if let Err(why) = stops.refresh(session.driver_id).await {
            log::warn!("Using previous stop list, refresh failed: {why}");
        }
        let plan = self.plan(origin, stops).await?;
        self.optimize(&plan).await
    }
}

/// Applies the service's waypoint order. Falls back to backend order if the
/// service did not reorder or returned something that is not a permutation.
fn visiting_order(stops: &[DeliveryStop], order: &[usize]) -> Vec<DeliveryStop> {
    let mut seen = vec![false; stops.len()];
    let is_permutation = order.len() == stops.len()
        && order
            .iter()
            .all(|&index| index < stops.len() && !std::mem::replace(&mut seen[index], true));

    if !is_permutation {
        if !order.is_empty() {
            log::warn!("Ignoring invalid waypoint order {order:?}.");
        }
        return stops.to_vec();
    }
    order.iter().map(|&index| stops[index].clone()).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use directions::{
        model::{DirectionsResponse, EncodedPolyline, Leg, Route, Step},
        DirectionsError,
    };

    use super::*;
    use crate::testing::{invoice, FakeBackend, FakeDirections};

    fn step(points: &str) -> Step {
        Step {
            polyline: EncodedPolyline {
                points: points.to_owned(),
            },
        }
    }

    fn response(routes: Vec<Route>) -> DirectionsResponse {
        DirectionsResponse {
            status: Some("OK".to_owned()),
            routes,
        }
    }

    fn plan(stops: Vec<DeliveryStop>) -> WaypointPlan {
        WaypointPlan::new(GeoPoint::new(38.5, -120.2), stops, GeoPoint::new(43.252, -126.453))
    }

    fn stop(id: i32, latitude: f64, longitude: f64) -> DeliveryStop {
        DeliveryStop::new(id, format!("Store {id}"), GeoPoint::new(latitude, longitude))
    }

    #[tokio::test]
    async fn test_empty_stop_list_still_routes() {
        let directions = FakeDirections::new(Ok(response(vec![Route {
            legs: vec![Leg {
                steps: vec![step("_p~iF~ps|U_ulLnnqC")],
            }],
            waypoint_order: Vec::new(),
        }])));
        let optimizer = RouteOptimizer::new(directions);

        let route = optimizer.optimize(&plan(Vec::new())).await.unwrap();

        assert_eq!(route.path.len(), 2);
        assert!(route.stops.is_empty());
        assert!(!route.truncated);
        let requests = optimizer.directions.requests();
        let request = &requests[0];
        assert!(request.waypoints.is_empty());
        assert_eq!(request.destination, GeoPoint::new(43.252, -126.453));
    }

    #[tokio::test]
    async fn test_concatenates_steps_of_first_route_only() {
        let first = Route {
            legs: vec![
                Leg {
                    steps: vec![step("_p~iF~ps|U_ulLnnqC"), step("_mqNvxq`@")],
                },
                Leg {
                    steps: vec![step("??")],
                },
            ],
            waypoint_order: vec![1, 0],
        };
        let alternative = Route {
            legs: vec![Leg {
                steps: vec![step("_p~iF~ps|U")],
            }],
            waypoint_order: Vec::new(),
        };
        let optimizer =
            RouteOptimizer::new(FakeDirections::new(Ok(response(vec![first, alternative]))));
        let plan = plan(vec![stop(1, 1.0, 1.0), stop(2, 2.0, 2.0)]);

        let route = optimizer.optimize(&plan).await.unwrap();

        // each step starts from zero, so the second step decodes on its own
        assert_eq!(route.path.len(), 4);
        assert!((route.path.points[0].latitude - 38.5).abs() < 1e-9);
        assert!((route.path.points[1].latitude - 40.7).abs() < 1e-9);
        assert!((route.path.points[2].latitude - 2.552).abs() < 1e-9);
        assert_eq!(route.path.points[3], GeoPoint::new(0.0, 0.0));
        let ids: Vec<i32> = route.stops.iter().map(|stop| stop.invoice_id).collect();
        assert_eq!(ids, vec![2, 1]);

        let requests = optimizer.directions.requests();
        let request = &requests[0];
        assert!(request.optimize);
        assert_eq!(
            request.waypoints,
            vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)]
        );
    }

    #[tokio::test]
    async fn test_keeps_duplicate_points_at_step_boundaries() {
        let route = Route {
            legs: vec![Leg {
                steps: vec![step("_p~iF~ps|U"), step("_p~iF~ps|U")],
            }],
            waypoint_order: Vec::new(),
        };
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(response(vec![route]))));

        let route = optimizer.optimize(&plan(Vec::new())).await.unwrap();

        assert_eq!(route.path.len(), 2);
        assert_eq!(route.path.points[0], route.path.points[1]);
    }

    #[tokio::test]
    async fn test_truncated_step_is_flagged() {
        let route = Route {
            legs: vec![Leg {
                steps: vec![step("_p~iF~ps|U_")],
            }],
            waypoint_order: Vec::new(),
        };
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(response(vec![route]))));

        let route = optimizer.optimize(&plan(Vec::new())).await.unwrap();

        assert!(route.truncated);
        assert_eq!(route.path.len(), 1);
    }

    #[tokio::test]
    async fn test_no_routes_is_no_route() {
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(DirectionsResponse {
            status: Some("ZERO_RESULTS".to_owned()),
            routes: Vec::new(),
        })));

        assert!(matches!(
            optimizer.optimize(&plan(Vec::new())).await,
            Err(TrackingError::NoRoute)
        ));
    }

    #[tokio::test]
    async fn test_route_without_steps_is_no_route() {
        let optimizer =
            RouteOptimizer::new(FakeDirections::new(Ok(response(vec![Route::default()]))));

        assert!(matches!(
            optimizer.optimize(&plan(Vec::new())).await,
            Err(TrackingError::NoRoute)
        ));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_no_route() {
        let error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let optimizer =
            RouteOptimizer::new(FakeDirections::new(Err(DirectionsError::from(error))));

        assert!(matches!(
            optimizer.optimize(&plan(Vec::new())).await,
            Err(TrackingError::NoRoute)
        ));
    }

    #[tokio::test]
    async fn test_failed_call_is_unavailable() {
        let optimizer = RouteOptimizer::new(FakeDirections::new(Err(
            DirectionsError::InvalidResponse {
                status_code: directions::StatusCode::SERVICE_UNAVAILABLE,
                response: None,
            },
        )));

        let error = optimizer.optimize(&plan(Vec::new())).await.unwrap_err();
        assert!(matches!(error, TrackingError::Unavailable(_)));
        assert_ne!(error.user_message(), TrackingError::NoRoute.user_message());
    }

    #[tokio::test]
    async fn test_optimize_from_snapshot() {
        let backend = Arc::new(FakeBackend::with_invoices(vec![
            invoice(5, "Echo", 5.0, 50.0),
            invoice(6, "Foxtrot", 6.0, 60.0),
        ]));
        let stops = StopCollector::new(backend.clone());
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(response(vec![Route {
            legs: vec![Leg {
                steps: vec![step("_p~iF~ps|U")],
            }],
            waypoint_order: vec![0, 1],
        }]))));

        let route = optimizer
            .optimize_from(
                Some(&Session::new("token", 3)),
                GeoPoint::new(1.0, 1.0),
                &stops,
            )
            .await
            .unwrap();

        assert_eq!(route.stops.len(), 2);
        assert_eq!(backend.collect_requests(), vec![3]);
        let requests = optimizer.directions.requests();
        let request = &requests[0];
        assert_eq!(request.origin, GeoPoint::new(1.0, 1.0));
        assert_eq!(request.destination, backend.warehouse());
        assert_eq!(
            request.waypoints,
            vec![GeoPoint::new(5.0, 50.0), GeoPoint::new(6.0, 60.0)]
        );
    }

    #[tokio::test]
    async fn test_optimize_from_requires_session() {
        let stops = StopCollector::new(Arc::new(FakeBackend::default()));
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(response(Vec::new()))));

        assert!(matches!(
            optimizer
                .optimize_from(None, GeoPoint::new(1.0, 1.0), &stops)
                .await,
            Err(TrackingError::AuthMissing)
        ));
        assert!(optimizer.directions.requests().is_empty());
    }

    #[tokio::test]
    async fn test_optimize_from_without_warehouse_is_unavailable() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_offline(true);
        let stops = StopCollector::new(backend);
        let optimizer = RouteOptimizer::new(FakeDirections::new(Ok(response(Vec::new()))));

        assert!(matches!(
            optimizer
                .optimize_from(Some(&Session::new("token", 3)), GeoPoint::new(1.0, 1.0), &stops)
                .await,
            Err(TrackingError::Unavailable(_))
        ));
    }

    #[test]
    fn test_invalid_waypoint_order_keeps_backend_order() {
        let stops = vec![stop(1, 1.0, 1.0), stop(2, 2.0, 2.0)];

        for order in [vec![0, 0], vec![0], vec![0, 2]] {
            let ids: Vec<i32> = visiting_order(&stops, &order)
                .iter()
                .map(|stop| stop.invoice_id)
                .collect();
            assert_eq!(ids, vec![1, 2]);
        }
    }
}
