//! Airports and flight record builders.

use chrono::{DateTime, TimeZone, Utc};
use shipment_map::flight::{Airport, FlightRecord, Position};
use shipment_map::geo::GeoPoint;

/// A named airport with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub code: &'static str,
    pub city: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(code: &'static str, city: &'static str, lat: f64, lng: f64) -> Self {
        Self { code, city, lat, lng }
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn airport(&self) -> Airport {
        Airport {
            code: self.code.to_string(),
            code_iata: Some(self.code.to_string()),
            name: format!("{} International", self.city),
            city: self.city.to_string(),
            country: "XX".to_string(),
            terminal: None,
            gate: None,
        }
    }
}

// ============================================================================
// Airports
// ============================================================================

pub const ACC: Location = Location::new("ACC", "Accra", 5.6051, -0.1657);
pub const DXB: Location = Location::new("DXB", "Dubai", 25.2532, 55.3657);
pub const JFK: Location = Location::new("JFK", "New York", 40.6413, -73.7781);
pub const LHR: Location = Location::new("LHR", "London", 51.47, -0.4543);
pub const HND: Location = Location::new("HND", "Tokyo", 35.5494, 139.7798);
pub const SYD: Location = Location::new("SYD", "Sydney", -33.9399, 151.1753);
pub const GRU: Location = Location::new("GRU", "Sao Paulo", -23.4356, -46.4731);
pub const MIA: Location = Location::new("MIA", "Miami", 25.7959, -80.287);
pub const BOM: Location = Location::new("BOM", "Mumbai", 19.0896, 72.8656);
pub const SIN: Location = Location::new("SIN", "Singapore", 1.3644, 103.9915);
pub const BER: Location = Location::new("BER", "Berlin", 52.3667, 13.5033);
pub const PVG: Location = Location::new("PVG", "Shanghai", 31.1443, 121.8083);
pub const CPT: Location = Location::new("CPT", "Cape Town", -33.9715, 18.6021);
pub const AMS: Location = Location::new("AMS", "Amsterdam", 52.3105, 4.7683);

pub fn departure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 18, 1, 0, 0).unwrap()
}

// ============================================================================
// Flight builders
// ============================================================================

/// Straight-line flight from `origin` to `destination`, currently at
/// `fraction` of the way along, ten hours long.
pub fn flight(id: &str, origin: &Location, destination: &Location, fraction: f64) -> FlightRecord {
    let position = GeoPoint::new(
        origin.lat + (destination.lat - origin.lat) * fraction,
        origin.lng + (destination.lng - origin.lng) * fraction,
    );
    let departure = departure();

    FlightRecord {
        ident: id.to_string(),
        fa_flight_id: format!("{}-1766019600-schedule-0001", id),
        shipment_id: Some(format!("SHIP-{}", id)),
        company: None,
        origin_country_code: None,
        waypoints: vec![
            origin.lat,
            origin.lng,
            position.lat,
            position.lng,
            destination.lat,
            destination.lng,
        ],
        last_position: Position {
            latitude: position.lat,
            longitude: position.lng,
            heading: 90.0,
        },
        origin: origin.airport(),
        destination: destination.airport(),
        actual_off: departure,
        actual_on: None,
        predicted_on: Some(departure + chrono::Duration::hours(10)),
        predicted_in: None,
    }
}

/// The demo fleet: a mix of short, long and date-line crossing routes.
pub fn fleet() -> Vec<FlightRecord> {
    vec![
        flight("EK788", &ACC, &DXB, 0.4),
        flight("BA178", &JFK, &LHR, 0.7),
        flight("QF26", &SYD, &HND, 0.2),
        flight("LA8180", &GRU, &MIA, 0.5),
        flight("SQ421", &BOM, &SIN, 0.9),
        flight("LH728", &BER, &PVG, 0.3),
        flight("KL592", &CPT, &AMS, 0.6),
    ]
}
