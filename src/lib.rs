//! shipment-map core
//!
//! Viewport control, overlay synchronization and route geometry for an
//! interactive map of in-transit shipments.

pub mod config;
pub mod error;
pub mod events;
pub mod flight;
pub mod geo;
pub mod overlay;
pub mod progress;
pub mod projection;
pub mod route;
pub mod scheduler;
pub mod shipment;
pub mod traits;
pub mod viewport;

pub use error::{Error, Result};
