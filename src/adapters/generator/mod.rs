//! Generator processors bound to directive identifiers.

pub mod routes;

pub use routes::{ROUTE_DIRECTIVE, RouteProcessor, render_routing_file};
