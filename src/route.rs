//! Route geometry built from flat waypoint lists.
//!
//! Waypoints arrive as `[lat1, lng1, lat2, lng2, ...]`. Longitudes are
//! never normalized: upstream data may write 195.0 instead of -165.0 so a
//! path crossing the date line draws as one monotonic line, and every
//! operation here works literally in that coordinate space.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::geo::{GeoBounds, GeoPoint};

/// Groups a flat waypoint list into `(lat, lng)` points, preserving order.
///
/// A trailing unpaired value is dropped instead of failing. This tolerates
/// malformed upstream data; it does not make such data correct. Use
/// [`try_to_points`] to reject it.
pub fn to_points(flat: &[f64]) -> Vec<GeoPoint> {
    if flat.len() % 2 != 0 {
        warn!(
            len = flat.len(),
            "dropping trailing unpaired waypoint value"
        );
    }

    flat.chunks_exact(2)
        .map(|pair| GeoPoint::new(pair[0], pair[1]))
        .collect()
}

/// Strict variant of [`to_points`]: odd-length lists and out-of-range
/// latitudes are errors.
pub fn try_to_points(flat: &[f64]) -> Result<Vec<GeoPoint>> {
    if flat.len() % 2 != 0 {
        return Err(Error::OddWaypointCount(flat.len()));
    }

    let points = to_points(flat);
    if let Some((index, point)) = points
        .iter()
        .enumerate()
        .find(|(_, point)| !(-90.0..=90.0).contains(&point.lat))
    {
        return Err(Error::LatitudeOutOfRange {
            index,
            value: point.lat,
        });
    }

    Ok(points)
}

/// Side of the origin marker the tooltip is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipDirection {
    Top,
    Bottom,
    Left,
    Right,
}

/// Tooltip side plus its pixel offset `(x, y)` from the marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipPlacement {
    pub direction: TooltipDirection,
    pub offset: (f64, f64),
}

/// Places the tooltip on the side the route is not heading towards.
///
/// Strictly vertical-dominant routes put it below a northbound origin and
/// above a southbound one. All others, exact diagonals included, are
/// horizontal: left of an eastbound origin, right of a westbound one.
pub fn tooltip_placement(origin: GeoPoint, destination: GeoPoint, offset_px: f64) -> TooltipPlacement {
    let d_lat = destination.lat - origin.lat;
    let d_lng = destination.lng - origin.lng;

    if d_lat.abs() > d_lng.abs() {
        if d_lat > 0.0 {
            TooltipPlacement {
                direction: TooltipDirection::Bottom,
                offset: (0.0, offset_px),
            }
        } else {
            TooltipPlacement {
                direction: TooltipDirection::Top,
                offset: (0.0, -offset_px),
            }
        }
    } else if d_lng > 0.0 {
        TooltipPlacement {
            direction: TooltipDirection::Left,
            offset: (-offset_px, 0.0),
        }
    } else {
        TooltipPlacement {
            direction: TooltipDirection::Right,
            offset: (offset_px, 0.0),
        }
    }
}

/// A drawable route of at least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    /// Builds a route from already-paired points.
    ///
    /// Returns `None` for fewer than two points: such an entity has no
    /// route and nothing should be drawn for it.
    pub fn new(points: Vec<GeoPoint>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { points })
    }

    pub fn from_waypoints(flat: &[f64]) -> Option<Self> {
        Self::new(to_points(flat))
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn origin(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn destination(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    pub fn tooltip_placement(&self, offset_px: f64) -> TooltipPlacement {
        tooltip_placement(self.origin(), self.destination(), offset_px)
    }

    pub fn bounds(&self) -> GeoBounds {
        let mut bounds = GeoBounds::from(self.origin());
        for point in &self.points[1..] {
            bounds.extend(*point);
        }
        bounds
    }

    /// True when any longitude lies outside [-180, 180].
    pub fn crosses_antimeridian(&self) -> bool {
        self.points.iter().any(|point| !(-180.0..=180.0).contains(&point.lng))
    }

    /// Point at `fraction` of the path, measured along segment lengths in
    /// degree space. `fraction` is clamped to `[0, 1]`.
    pub fn point_at(&self, fraction: f64) -> GeoPoint {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };

        let lengths: Vec<f64> = self
            .points
            .windows(2)
            .map(|pair| segment_length(pair[0], pair[1]))
            .collect();
        let total: f64 = lengths.iter().sum();
        if total == 0.0 {
            return self.origin();
        }

        let mut remaining = fraction * total;
        for (pair, length) in self.points.windows(2).zip(&lengths) {
            if remaining <= *length && *length > 0.0 {
                let t = remaining / length;
                return GeoPoint::new(
                    pair[0].lat + (pair[1].lat - pair[0].lat) * t,
                    pair[0].lng + (pair[1].lng - pair[0].lng) * t,
                );
            }
            remaining -= length;
        }

        self.destination()
    }
}

fn segment_length(from: GeoPoint, to: GeoPoint) -> f64 {
    (to.lat - from.lat).hypot(to.lng - from.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_none, assert_ok, assert_some};

    #[test]
    fn test_to_points_pairs_in_order() {
        let points = to_points(&[5.6, -0.17, 12.0, 20.0, 25.25, 55.37]);
        assert_eq!(
            points,
            vec![
                GeoPoint::new(5.6, -0.17),
                GeoPoint::new(12.0, 20.0),
                GeoPoint::new(25.25, 55.37),
            ]
        );
    }

    #[test]
    fn test_to_points_drops_trailing_value() {
        let points = to_points(&[1.0, 2.0, 3.0]);
        assert_eq!(points, vec![GeoPoint::new(1.0, 2.0)]);
    }

    #[test]
    fn test_try_to_points_rejects_odd_length() {
        let err = assert_err!(try_to_points(&[1.0, 2.0, 3.0]));
        assert!(matches!(err, Error::OddWaypointCount(3)));
    }

    #[test]
    fn test_try_to_points_rejects_bad_latitude() {
        let err = assert_err!(try_to_points(&[1.0, 2.0, 95.0, 10.0]));
        assert!(matches!(err, Error::LatitudeOutOfRange { index: 1, .. }));
    }

    #[test]
    fn test_try_to_points_accepts_unwrapped_longitude() {
        let points = assert_ok!(try_to_points(&[35.5, 139.8, 21.3, 202.1]));
        assert_eq!(points[1].lng, 202.1);
    }

    #[test]
    fn test_degenerate_routes() {
        assert_none!(Route::from_waypoints(&[]));
        assert_none!(Route::from_waypoints(&[1.0, 2.0]));
        assert_none!(Route::from_waypoints(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_route_endpoints() {
        let route = assert_some!(Route::from_waypoints(&[0.0, 0.0, 5.0, 5.0, 10.0, 10.0]));
        assert_eq!(route.origin(), GeoPoint::new(0.0, 0.0));
        assert_eq!(route.destination(), GeoPoint::new(10.0, 10.0));
        assert_eq!(route.points().len(), 3);
    }

    #[test]
    fn test_tooltip_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);

        let north = tooltip_placement(origin, GeoPoint::new(10.0, 0.0), 10.0);
        assert_eq!(north.direction, TooltipDirection::Bottom);
        assert_eq!(north.offset, (0.0, 10.0));

        let south = tooltip_placement(origin, GeoPoint::new(-10.0, 0.0), 10.0);
        assert_eq!(south.direction, TooltipDirection::Top);
        assert_eq!(south.offset, (0.0, -10.0));

        let east = tooltip_placement(origin, GeoPoint::new(0.0, 10.0), 10.0);
        assert_eq!(east.direction, TooltipDirection::Left);
        assert_eq!(east.offset, (-10.0, 0.0));

        let west = tooltip_placement(origin, GeoPoint::new(0.0, -10.0), 10.0);
        assert_eq!(west.direction, TooltipDirection::Right);
        assert_eq!(west.offset, (10.0, 0.0));
    }

    #[test]
    fn test_tooltip_diagonal_is_horizontal() {
        let route = assert_some!(Route::from_waypoints(&[0.0, 0.0, 10.0, 10.0]));
        let placement = route.tooltip_placement(10.0);
        assert_eq!(placement.direction, TooltipDirection::Left);
        assert_eq!(placement.offset, (-10.0, 0.0));

        let south_west = tooltip_placement(GeoPoint::new(0.0, 0.0), GeoPoint::new(-4.0, -4.0), 10.0);
        assert_eq!(south_west.direction, TooltipDirection::Right);

        let mostly_north = tooltip_placement(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 9.99), 10.0);
        assert_eq!(mostly_north.direction, TooltipDirection::Bottom);
    }

    #[test]
    fn test_tooltip_same_point_goes_right() {
        let point = GeoPoint::new(3.0, 3.0);
        assert_eq!(tooltip_placement(point, point, 10.0).direction, TooltipDirection::Right);
    }

    #[test]
    fn test_antimeridian_route_stays_literal() {
        // Tokyo to Honolulu written eastward past 180.
        let route = assert_some!(Route::from_waypoints(&[35.55, 139.78, 28.0, 175.0, 21.32, 202.07]));

        assert!(route.crosses_antimeridian());
        let bounds = route.bounds();
        assert_eq!(bounds.south_west.lng, 139.78);
        assert_eq!(bounds.north_east.lng, 202.07);
        assert_eq!(route.tooltip_placement(10.0).direction, TooltipDirection::Left);
    }

    #[test]
    fn test_point_at_interpolates_literally() {
        let route = assert_some!(Route::from_waypoints(&[0.0, 170.0, 0.0, 190.0]));

        assert_eq!(route.point_at(0.0), GeoPoint::new(0.0, 170.0));
        assert_eq!(route.point_at(0.5), GeoPoint::new(0.0, 180.0));
        assert_eq!(route.point_at(1.0), GeoPoint::new(0.0, 190.0));
        assert_eq!(route.point_at(2.0), GeoPoint::new(0.0, 190.0));
    }

    #[test]
    fn test_point_at_multi_segment() {
        let route = assert_some!(Route::from_waypoints(&[0.0, 0.0, 0.0, 10.0, 10.0, 10.0]));
        let point = route.point_at(0.75);
        assert!((point.lat - 5.0).abs() < 1e-9);
        assert!((point.lng - 10.0).abs() < 1e-9);
    }
}
