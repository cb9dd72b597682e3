//! Map configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geo::{GeoBounds, GeoPoint};
use crate::progress::ProgressOptions;

/// Edge length of a base map tile in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub tile_size_px: f64,
    pub default_center: GeoPoint,
    pub default_zoom: f64,
    pub max_zoom: f64,
    /// Padding applied on every side when fitting content.
    pub fit_padding_px: f64,
    /// Pan limit; wider than the world so date-line routes stay reachable.
    pub max_pan_bounds: GeoBounds,
    /// 1.0 clamps pans at the bounds with no overshoot.
    pub max_bounds_viscosity: f64,
    pub close_delay_ms: u64,
    pub tooltip_offset_px: f64,
    pub progress: ProgressOptions,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size_px: TILE_SIZE_PX,
            default_center: GeoPoint::new(0.0, 0.0),
            default_zoom: 2.0,
            max_zoom: 18.0,
            fit_padding_px: 50.0,
            max_pan_bounds: GeoBounds::new(GeoPoint::new(-90.0, -220.0), GeoPoint::new(90.0, 280.0)),
            max_bounds_viscosity: 1.0,
            close_delay_ms: 120,
            tooltip_offset_px: 10.0,
            progress: ProgressOptions::default(),
        }
    }
}

impl MapConfig {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    /// Rejects settings the viewport math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size_px.is_nan() || self.tile_size_px <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tile_size_px must be positive, got {}",
                self.tile_size_px
            )));
        }
        if !self.max_zoom.is_finite() || self.max_zoom < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_zoom must be finite and non-negative, got {}",
                self.max_zoom
            )));
        }
        if !self.default_zoom.is_finite() || !(0.0..=self.max_zoom).contains(&self.default_zoom) {
            return Err(Error::InvalidConfig(format!(
                "default_zoom must be within [0, {}], got {}",
                self.max_zoom, self.default_zoom
            )));
        }
        if self.close_delay_ms == 0 {
            return Err(Error::InvalidConfig("close_delay_ms must be positive".to_string()));
        }
        if self.fit_padding_px < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fit_padding_px must not be negative, got {}",
                self.fit_padding_px
            )));
        }
        if !(0.0..=1.0).contains(&self.max_bounds_viscosity) {
            return Err(Error::InvalidConfig(format!(
                "max_bounds_viscosity must be within [0, 1], got {}",
                self.max_bounds_viscosity
            )));
        }
        let bounds = &self.max_pan_bounds;
        if bounds.south_west.lat > bounds.north_east.lat || bounds.south_west.lng > bounds.north_east.lng {
            return Err(Error::InvalidConfig("max_pan_bounds corners are inverted".to_string()));
        }
        if !(0.0..=100.0).contains(&self.progress.unlanded_cap) {
            return Err(Error::InvalidConfig(format!(
                "progress.unlanded_cap must be within [0, 100], got {}",
                self.progress.unlanded_cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = MapConfig::default();
        assert_ok!(config.validate());
        assert_eq!(config.close_delay(), Duration::from_millis(120));
        assert_eq!(config.max_pan_bounds.south_west.lng, -220.0);
        assert_eq!(config.max_pan_bounds.north_east.lng, 280.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: MapConfig =
            serde_json::from_str(r#"{"fit_padding_px": 20, "progress": {"unlanded_cap": 90}}"#)
                .expect("parse config");

        assert_eq!(config.fit_padding_px, 20.0);
        assert_eq!(config.progress.unlanded_cap, 90.0);
        assert_eq!(config.progress.early_minutes, 12);
        assert_eq!(config.default_zoom, 2.0);
    }

    #[test]
    fn test_rejects_zero_tile_size() {
        let config = MapConfig {
            tile_size_px: 0.0,
            ..MapConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = MapConfig {
            max_pan_bounds: GeoBounds::new(GeoPoint::new(90.0, 280.0), GeoPoint::new(-90.0, -220.0)),
            ..MapConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_rejects_nan_max_zoom() {
        let config = MapConfig {
            max_zoom: f64::NAN,
            ..MapConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_rejects_negative_max_zoom() {
        let config = MapConfig {
            max_zoom: -1.0,
            ..MapConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_rejects_non_finite_default_zoom() {
        let config = MapConfig {
            default_zoom: f64::INFINITY,
            ..MapConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_rejects_default_zoom_outside_range() {
        let above = MapConfig {
            default_zoom: 19.0,
            ..MapConfig::default()
        };
        assert_err!(above.validate());

        let below = MapConfig {
            default_zoom: -0.5,
            ..MapConfig::default()
        };
        assert_err!(below.validate());
    }
}
