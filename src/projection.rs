//! Geographic to screen coordinate transform.
//!
//! Spherical Web Mercator over a square tile grid. Every function is a pure
//! function of its arguments; there is nothing to invalidate when the
//! viewport changes, callers simply project again.

use std::f64::consts::PI;

use crate::geo::{GeoPoint, ScreenPoint};
use crate::viewport::ViewportState;

/// Latitude limit of the Mercator square.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Side length in pixels of the whole world at `zoom`.
pub fn world_size(zoom: f64, tile_size_px: f64) -> f64 {
    tile_size_px * 2_f64.powf(zoom)
}

/// Absolute pixel position of `geo` in the world square at `zoom`.
///
/// Longitudes outside ±180 land outside `[0, world_size)` on the x axis,
/// which is what keeps antimeridian-continuous routes unbroken.
pub fn project_world(geo: GeoPoint, zoom: f64, tile_size_px: f64) -> ScreenPoint {
    let size = world_size(zoom, tile_size_px);
    let lat = geo.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin_lat = lat.to_radians().sin();

    ScreenPoint::new(
        size * (geo.lng + 180.0) / 360.0,
        size * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)),
    )
}

/// Inverse of [`project_world`].
pub fn unproject_world(point: ScreenPoint, zoom: f64, tile_size_px: f64) -> GeoPoint {
    let size = world_size(zoom, tile_size_px);
    let n = PI - 2.0 * PI * point.y / size;

    GeoPoint::new(n.sinh().atan().to_degrees(), point.x / size * 360.0 - 180.0)
}

/// Container-relative pixel position of `geo` under `viewport`.
///
/// The viewport center maps to the middle of the container.
pub fn project(geo: GeoPoint, viewport: &ViewportState) -> ScreenPoint {
    let point = project_world(geo, viewport.zoom, viewport.tile_size_px);
    let center = project_world(viewport.center, viewport.zoom, viewport.tile_size_px);

    ScreenPoint::new(
        point.x - center.x + viewport.size.width / 2.0,
        point.y - center.y + viewport.size.height / 2.0,
    )
}

/// Geographic position under a container-relative pixel.
pub fn unproject(screen: ScreenPoint, viewport: &ViewportState) -> GeoPoint {
    let center = project_world(viewport.center, viewport.zoom, viewport.tile_size_px);
    let world = ScreenPoint::new(
        screen.x + center.x - viewport.size.width / 2.0,
        screen.y + center.y - viewport.size.height / 2.0,
    );

    unproject_world(world, viewport.zoom, viewport.tile_size_px)
}
