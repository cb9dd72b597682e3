//! Viewport controller: camera center/zoom, container size and pan limits.
//!
//! The controller is the only writer of [`ViewportState`]. Everything else
//! receives copies through [`ViewportEvent`]s or [`ViewportController::state`]
//! and re-derives screen positions from them.

use tracing::{debug, trace, warn};

use crate::config::{MapConfig, TILE_SIZE_PX};
use crate::events::{Subscription, ViewportEvent, ViewportEventKind, ViewportEvents};
use crate::geo::{ContainerSize, GeoBounds, GeoPoint, ScreenPoint};
use crate::projection::{project_world, unproject_world};

/// Zoom changes smaller than this are treated as no change.
const ZOOM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub center: GeoPoint,
    pub zoom: f64,
    pub size: ContainerSize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_bounds: Option<GeoBounds>,
    pub tile_size_px: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            zoom: 2.0,
            size: ContainerSize::default(),
            min_zoom: 0.0,
            max_zoom: 18.0,
            max_bounds: None,
            tile_size_px: TILE_SIZE_PX,
        }
    }
}

/// Lowest zoom at which the world is at least as tall as the container.
///
/// `None` while the container has no height; the caller keeps the previous
/// value and retries on the next resize.
pub fn min_zoom_for_height(height: f64, tile_size_px: f64) -> Option<f64> {
    if height <= 0.0 || tile_size_px <= 0.0 {
        return None;
    }
    Some((height / tile_size_px).log2().ceil())
}

pub struct ViewportController {
    state: ViewportState,
    pan_bounds: GeoBounds,
    viscosity: f64,
    fit_padding_px: f64,
    content: Vec<GeoPoint>,
    content_fitted: bool,
    events: ViewportEvents,
}

impl ViewportController {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            state: ViewportState {
                center: config.default_center,
                zoom: config.default_zoom,
                max_zoom: config.max_zoom,
                tile_size_px: config.tile_size_px,
                ..ViewportState::default()
            },
            pan_bounds: config.max_pan_bounds,
            viscosity: config.max_bounds_viscosity,
            fit_padding_px: config.fit_padding_px,
            content: Vec::new(),
            content_fitted: false,
            events: ViewportEvents::new(),
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn events(&self) -> &ViewportEvents {
        &self.events
    }

    /// Shorthand for subscribing to this controller's notifications.
    ///
    /// Listeners run synchronously inside the mutating call and must not
    /// call back into the controller.
    pub fn subscribe(
        &self,
        kinds: &[ViewportEventKind],
        listener: impl Fn(&ViewportEvent) + 'static,
    ) -> Subscription {
        self.events.subscribe(kinds, listener)
    }

    /// Points the viewport is fitted to on every resize.
    pub fn set_content(&mut self, points: Vec<GeoPoint>) {
        self.content = points;
    }

    pub fn content_bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(&self.content)
    }

    /// Whether a resize has fitted the view to non-empty content yet.
    pub fn content_fitted(&self) -> bool {
        self.content_fitted
    }

    /// Initial layout; identical to a resize notification.
    pub fn mount(&mut self, size: ContainerSize) {
        self.on_container_resize(size);
    }

    /// Container resize handler.
    ///
    /// Order matters: `min_zoom` and the pan bounds both depend on the new
    /// size and must be settled before the content is re-fitted.
    pub fn on_container_resize(&mut self, size: ContainerSize) {
        self.state.size = size;

        match min_zoom_for_height(size.height, self.state.tile_size_px) {
            Some(min_zoom) => {
                self.state.min_zoom = min_zoom.min(self.state.max_zoom);
                debug!(
                    width = size.width,
                    height = size.height,
                    min_zoom = self.state.min_zoom,
                    "container resized"
                );
            }
            None => warn!(height = size.height, "container has no height, keeping min zoom"),
        }

        self.set_max_pan_bounds(self.pan_bounds);

        if !self.content.is_empty() {
            let content = std::mem::take(&mut self.content);
            if self.fit_to_bounds(&content, self.fit_padding_px) {
                self.content_fitted = true;
            }
            self.content = content;
        }

        self.events.emit(ViewportEvent {
            kind: ViewportEventKind::Resize,
            state: self.state,
        });
    }

    /// Restricts panning to `bounds` and pulls the current view inside them.
    pub fn set_max_pan_bounds(&mut self, bounds: GeoBounds) {
        self.pan_bounds = bounds;
        self.state.max_bounds = Some(bounds);
        self.set_view(self.state.center, self.state.zoom);
    }

    /// Centers and zooms so the box around `points`, inflated by `padding`
    /// pixels on each side, fits the container.
    ///
    /// Empty input leaves the viewport untouched. Returns whether a fit was
    /// applied; a container that is not laid out yet is fitted on its next
    /// resize instead.
    pub fn fit_to_bounds(&mut self, points: &[GeoPoint], padding: f64) -> bool {
        let Some(bounds) = GeoBounds::from_points(points) else {
            return false;
        };
        if !self.state.size.is_laid_out() {
            debug!("container not laid out, deferring fit");
            return false;
        }

        let zoom = self.bounds_zoom(&bounds, padding);
        let tile = self.state.tile_size_px;
        let south_west = project_world(bounds.south_west, zoom, tile);
        let north_east = project_world(bounds.north_east, zoom, tile);
        let middle = ScreenPoint::new(
            (south_west.x + north_east.x) / 2.0,
            (south_west.y + north_east.y) / 2.0,
        );

        self.set_view(unproject_world(middle, zoom, tile), zoom);
        true
    }

    /// Largest whole zoom level at which `bounds` fits inside the padded
    /// container, clamped to the allowed range.
    pub fn bounds_zoom(&self, bounds: &GeoBounds, padding: f64) -> f64 {
        let available_x = self.state.size.width - 2.0 * padding;
        let available_y = self.state.size.height - 2.0 * padding;
        if available_x <= 0.0 || available_y <= 0.0 {
            return self.state.min_zoom;
        }

        let tile = self.state.tile_size_px;
        let north_west = project_world(bounds.north_west(), self.state.zoom, tile);
        let south_east = project_world(bounds.south_east(), self.state.zoom, tile);
        let span_x = (south_east.x - north_west.x).abs();
        let span_y = (south_east.y - north_west.y).abs();

        // A zero span divides to infinity, which clamps to max zoom below.
        let scale = (available_x / span_x).min(available_y / span_y);
        let zoom = self.state.zoom + scale.log2();
        let zoom = ((zoom * 100.0).round() / 100.0).floor();

        self.clamp_zoom(zoom)
    }

    /// Moves the view by a pixel offset, clamped to the pan bounds.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let tile = self.state.tile_size_px;
        let current = project_world(self.state.center, self.state.zoom, tile);
        let target = unproject_world(ScreenPoint::new(current.x + dx, current.y + dy), self.state.zoom, tile);
        let center = self.limit_center(target, self.state.zoom, self.viscosity);

        trace!(dx, dy, lat = center.lat, lng = center.lng, "pan");
        self.apply(center, self.state.zoom);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.set_view(self.state.center, zoom);
    }

    /// Programmatic view change; zoom and center are both clamped.
    pub fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        let zoom = self.clamp_zoom(zoom);
        let center = self.limit_center(center, zoom, 1.0);
        self.apply(center, zoom);
    }

    fn apply(&mut self, center: GeoPoint, zoom: f64) {
        let zoom_changed = (zoom - self.state.zoom).abs() > ZOOM_EPSILON;
        let moved = zoom_changed || center != self.state.center;

        self.state.center = center;
        self.state.zoom = zoom;

        if zoom_changed {
            self.events.emit(ViewportEvent {
                kind: ViewportEventKind::Zoom,
                state: self.state,
            });
        }
        if moved {
            self.events.emit(ViewportEvent {
                kind: ViewportEventKind::Move,
                state: self.state,
            });
        }
    }

    /// Never panics, even for an inverted or NaN range from unvalidated
    /// config.
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.state.min_zoom).min(self.state.max_zoom)
    }

    /// Pulls `center` back so the visible area stays inside the max bounds.
    ///
    /// `viscosity` 1.0 removes the whole overshoot, 0.0 none of it.
    fn limit_center(&self, center: GeoPoint, zoom: f64, viscosity: f64) -> GeoPoint {
        let Some(bounds) = self.state.max_bounds else {
            return center;
        };
        if !self.state.size.is_laid_out() {
            return center;
        }

        let tile = self.state.tile_size_px;
        let point = project_world(center, zoom, tile);
        let half_x = self.state.size.width / 2.0;
        let half_y = self.state.size.height / 2.0;
        let limit_min = project_world(bounds.north_west(), zoom, tile);
        let limit_max = project_world(bounds.south_east(), zoom, tile);

        let dx = rebound(limit_min.x - (point.x - half_x), (point.x + half_x) - limit_max.x);
        let dy = rebound(limit_min.y - (point.y - half_y), (point.y + half_y) - limit_max.y);
        if dx == 0.0 && dy == 0.0 {
            return center;
        }

        unproject_world(
            ScreenPoint::new(point.x + dx * viscosity, point.y + dy * viscosity),
            zoom,
            tile,
        )
    }
}

/// Offset that moves a view back inside its limits.
///
/// `left` is how far the view overshoots the minimum edge, `right` how far
/// it overshoots the maximum edge. A view larger than the limits is centered.
fn rebound(left: f64, right: f64) -> f64 {
    if left + right > 0.0 {
        (left - right) / 2.0
    } else {
        left.max(0.0) - right.max(0.0)
    }
}
