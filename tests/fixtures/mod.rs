#![allow(dead_code)]

//! Test fixtures for shipment-map.
//!
//! Provides realistic test data including:
//! - Real airport locations used by the demo data set
//! - Builders for flight records between them

pub mod airports;

pub use airports::*;
