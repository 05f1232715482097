use std::error::Error;
use std::fmt;
use std::sync::Arc;

use backend::ApiError;
use directions::DirectionsError;

pub mod config;
pub mod credentials;
pub mod poller;
pub mod position;
pub mod route;
pub mod stops;
pub mod sync;

#[cfg(test)]
mod testing;

use crate::position::FixError;

#[derive(Debug, Clone)]
pub enum TrackingError {
    /// No session or an empty token. Callers skip the operation.
    AuthMissing,
    PermissionDenied,
    /// Location services are not supported or switched off.
    FeatureUnavailable(String),
    /// Any other failure while acquiring a position fix.
    Fix(String),
    /// Transport or parse failure of a network call.
    Unavailable(Arc<dyn Error + Send + Sync>),
    /// The directions service did not return a usable route.
    NoRoute,
}

impl TrackingError {
    pub fn unavailable<E: Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Unavailable(Arc::new(why))
    }

    /// Text shown to the driver when an interactive request fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            TrackingError::AuthMissing => "You are not signed in.",
            TrackingError::PermissionDenied => "Location permission was denied.",
            TrackingError::FeatureUnavailable(_) => {
                "Location services are not available on this device."
            }
            TrackingError::Fix(_) => "The current location could not be determined.",
            TrackingError::Unavailable(_) => {
                "The service is currently unavailable. Please try again later."
            }
            TrackingError::NoRoute => "No route could be found for the pending deliveries.",
        }
    }
}

impl Error for TrackingError {}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackingError::AuthMissing => write!(f, "No authenticated session."),
            TrackingError::PermissionDenied => write!(f, "Location permission denied."),
            TrackingError::FeatureUnavailable(why) => {
                write!(f, "Location feature unavailable: {why}")
            }
            TrackingError::Fix(why) => write!(f, "Position fix failed: {why}"),
            TrackingError::Unavailable(why) => write!(f, "Unavailable: {why}"),
            TrackingError::NoRoute => write!(f, "No route found."),
        }
    }
}

impl From<ApiError> for TrackingError {
    fn from(why: ApiError) -> Self {
        Self::unavailable(why)
    }
}

impl From<DirectionsError> for TrackingError {
    fn from(why: DirectionsError) -> Self {
        if why.is_unparseable() {
            Self::NoRoute
        } else {
            Self::unavailable(why)
        }
    }
}

impl From<FixError> for TrackingError {
    fn from(why: FixError) -> Self {
        match why {
            FixError::PermissionDenied => Self::PermissionDenied,
            FixError::NotSupported | FixError::NotEnabled => {
                Self::FeatureUnavailable(why.to_string())
            }
            FixError::Other(why) => Self::Fix(why),
        }
    }
}
