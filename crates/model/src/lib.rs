pub use utility::geo::GeoPoint;

pub mod location;
pub mod route;
pub mod session;
pub mod stop;
