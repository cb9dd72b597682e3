/// Errors for inputs the map refuses to interpret.
///
/// Degenerate but well-formed input (short routes, missing arrival times,
/// an un-laid-out container) is not an error; it renders nothing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Waypoint list has odd length {0} (expected interleaved lat/lng pairs)")]
    OddWaypointCount(usize),

    #[error("Latitude {value} at waypoint {index} is outside [-90, 90]")]
    LatitudeOutOfRange { index: usize, value: f64 },

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
