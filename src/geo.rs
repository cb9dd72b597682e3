//! Geographic and screen-space value types.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Longitude is unrestricted: values past ±180 keep a path
/// that crosses the antimeridian continuous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns the point as a `(lat, lng)` tuple.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Container-relative pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the map container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A container with a non-positive dimension has not been laid out yet.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned geographic box.
///
/// Longitudes are compared literally, so a box built from an
/// antimeridian-continuous route spans the unwrapped range (e.g. 170..195)
/// rather than nearly the whole globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Smallest box containing every point; `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from(*first);
        for point in rest {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

impl From<GeoPoint> for GeoBounds {
    fn from(point: GeoPoint) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }
}
