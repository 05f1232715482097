pub mod geo;
pub mod polyline;
