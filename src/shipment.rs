//! Composition of the shipment map from entity snapshots.
//!
//! Each snapshot is complete: entities missing from it are gone. Per
//! entity the map derives a [`ShipmentPlan`] (route, markers, tooltip) and
//! keeps one overlay anchored at the entity's current position.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::MapConfig;
use crate::error::Result;
use crate::flight::FlightRecord;
use crate::geo::{ContainerSize, GeoPoint};
use crate::overlay::{AnchorId, OverlayAnchor, OverlaySynchronizer};
use crate::route::{Route, TooltipPlacement, to_points};
use crate::traits::Scheduler;
use crate::viewport::ViewportController;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    Origin,
    Destination,
    /// Current position; rotation in degrees clockwise from north.
    Vehicle { rotation_deg: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: GeoPoint,
}

/// Everything drawn for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentPlan {
    pub id: String,
    pub route: Route,
    pub origin: Marker,
    pub destination: Marker,
    pub vehicle: Marker,
    pub tooltip: TooltipPlacement,
}

impl ShipmentPlan {
    /// `None` when the record has no drawable route; nothing at all is
    /// drawn for it then, not even the endpoint markers.
    pub fn build(record: &FlightRecord, config: &MapConfig) -> Option<Self> {
        Self::from_points(record, to_points(&record.waypoints), config)
    }

    /// Same as [`build`](Self::build) with the waypoints already paired.
    pub fn from_points(record: &FlightRecord, points: Vec<GeoPoint>, config: &MapConfig) -> Option<Self> {
        let route = Route::new(points)?;

        Some(Self {
            id: record.fa_flight_id.clone(),
            origin: Marker {
                kind: MarkerKind::Origin,
                position: route.origin(),
            },
            destination: Marker {
                kind: MarkerKind::Destination,
                position: route.destination(),
            },
            vehicle: Marker {
                kind: MarkerKind::Vehicle {
                    rotation_deg: record.last_position.heading.rem_euclid(360.0),
                },
                position: record.last_position.geo(),
            },
            tooltip: route.tooltip_placement(config.tooltip_offset_px),
            route,
        })
    }
}

/// Every waypoint of every record, used to fit the initial view.
pub fn content_points(records: &[FlightRecord]) -> Vec<GeoPoint> {
    records
        .iter()
        .flat_map(|record| to_points(&record.waypoints))
        .collect()
}

pub struct ShipmentMap {
    config: MapConfig,
    controller: ViewportController,
    overlays: OverlaySynchronizer<FlightRecord>,
    anchors: HashMap<String, AnchorId>,
    plans: Vec<ShipmentPlan>,
    fitted: bool,
}

impl ShipmentMap {
    pub fn new(config: MapConfig, scheduler: Rc<dyn Scheduler>) -> Result<Self> {
        config.validate()?;

        let controller = ViewportController::new(&config);
        let overlays = OverlaySynchronizer::attach(&controller, scheduler, config.close_delay());

        Ok(Self {
            config,
            controller,
            overlays,
            anchors: HashMap::new(),
            plans: Vec::new(),
            fitted: false,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewportController {
        &mut self.controller
    }

    pub fn overlays(&self) -> &OverlaySynchronizer<FlightRecord> {
        &self.overlays
    }

    pub fn plans(&self) -> &[ShipmentPlan] {
        &self.plans
    }

    pub fn anchor_for(&self, flight_id: &str) -> Option<AnchorId> {
        self.anchors.get(flight_id).copied()
    }

    pub fn mount(&mut self, size: ContainerSize) {
        self.on_container_resize(size);
    }

    /// A resize that fits pending content counts as the initial fit.
    pub fn on_container_resize(&mut self, size: ContainerSize) {
        self.controller.on_container_resize(size);
        self.fitted |= self.controller.content_fitted();
    }

    /// Applies a complete snapshot of entity records.
    ///
    /// The view is fitted to the content the first time content is
    /// available; later snapshots only update what a resize re-fits to.
    pub fn load_snapshot(&mut self, records: &[FlightRecord]) {
        let paired: Vec<Vec<GeoPoint>> = records
            .iter()
            .map(|record| to_points(&record.waypoints))
            .collect();

        let content: Vec<GeoPoint> = paired.iter().flatten().copied().collect();
        self.controller.set_content(content.clone());
        if !self.fitted && !content.is_empty() {
            self.fitted = self.controller.fit_to_bounds(&content, self.config.fit_padding_px);
        }

        let mut seen = HashSet::new();
        let mut plans = Vec::with_capacity(records.len());
        for (record, points) in records.iter().zip(paired) {
            let Some(plan) = ShipmentPlan::from_points(record, points, &self.config) else {
                continue;
            };

            let position = plan.vehicle.position;
            match self.anchors.get(&plan.id) {
                Some(&id) => {
                    self.overlays.set_position(id, position);
                    self.overlays.set_content(id, record.clone());
                }
                None => {
                    let id = self.overlays.register(OverlayAnchor::new(position, record.clone()));
                    self.anchors.insert(plan.id.clone(), id);
                }
            }

            seen.insert(plan.id.clone());
            plans.push(plan);
        }

        let overlays = &self.overlays;
        self.anchors.retain(|flight_id, id| {
            if seen.contains(flight_id) {
                return true;
            }
            overlays.remove(*id);
            false
        });

        debug!(
            records = records.len(),
            drawn = plans.len(),
            overlays = self.anchors.len(),
            "snapshot applied"
        );
        self.plans = plans;
    }

    /// Progress percentage of `record` at `now` under the configured caps.
    pub fn progress_for(&self, record: &FlightRecord, now: DateTime<Utc>) -> f64 {
        record.timing().progress_at(now, &self.config.progress)
    }
}
