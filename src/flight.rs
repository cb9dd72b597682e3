//! Entity records as supplied by the tracking data source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::progress::JourneyTiming;
use crate::route::Route;

/// Last reported position of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees clockwise from north.
    #[serde(default)]
    pub heading: f64,
}

impl Position {
    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default)]
    pub code_iata: Option<String>,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub gate: Option<String>,
}

impl Airport {
    /// IATA code when known, otherwise the provider code.
    pub fn display_code(&self) -> &str {
        self.code_iata.as_deref().unwrap_or(&self.code)
    }

    /// Terminal and gate, terminal alone, or `fallback`.
    pub fn terminal_label(&self, fallback: &str) -> String {
        match (&self.terminal, &self.gate) {
            (Some(terminal), Some(gate)) => format!("{} {}", terminal, gate),
            (Some(terminal), None) => terminal.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub ident: String,
    pub fa_flight_id: String,
    #[serde(default, rename = "shipmentId")]
    pub shipment_id: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, rename = "originCountryCode")]
    pub origin_country_code: Option<String>,
    /// Interleaved `[lat, lng, lat, lng, ...]`.
    #[serde(default)]
    pub waypoints: Vec<f64>,
    pub last_position: Position,
    pub origin: Airport,
    pub destination: Airport,
    pub actual_off: DateTime<Utc>,
    #[serde(default)]
    pub actual_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted_in: Option<DateTime<Utc>>,
}

impl FlightRecord {
    /// Company name, or the flight ident for records without one.
    pub fn display_name(&self) -> &str {
        self.company
            .as_deref()
            .filter(|company| !company.is_empty())
            .unwrap_or(&self.ident)
    }

    /// Shipment id, or the provider flight id for records without one.
    pub fn reference(&self) -> &str {
        self.shipment_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.fa_flight_id)
    }

    pub fn route_label(&self) -> String {
        format!("{} → {}", self.origin.code, self.destination.code)
    }

    /// Arrival prediction: runway estimate first, then gate arrival.
    pub fn predicted_arrival(&self) -> Option<DateTime<Utc>> {
        self.predicted_on.or(self.predicted_in)
    }

    pub fn timing(&self) -> JourneyTiming {
        JourneyTiming::new(self.actual_off, self.actual_on, self.predicted_arrival())
    }

    /// `None` when the waypoints do not form a drawable route.
    pub fn route(&self) -> Option<Route> {
        Route::from_waypoints(&self.waypoints)
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.fa_flight_id == id || self.shipment_id.as_deref() == Some(id)
    }
}

/// Finds a record by provider flight id or shipment id.
pub fn find_flight<'a>(records: &'a [FlightRecord], id: &str) -> Option<&'a FlightRecord> {
    records.iter().find(|record| record.matches_id(id))
}
