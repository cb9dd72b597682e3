//! Journey progress estimation.
//!
//! Everything here is a pure function of its inputs; callers pass `now`
//! explicitly on every refresh.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    /// Upper bound (percent) for journeys that have not landed.
    pub unlanded_cap: f64,
    /// Minutes shown in the "early" label of a landed journey.
    pub early_minutes: i64,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            unlanded_cap: 95.0,
            early_minutes: 12,
        }
    }
}

/// Timing of one journey, as reported in the entity snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JourneyTiming {
    pub departure: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub predicted_arrival: Option<DateTime<Utc>>,
}

impl JourneyTiming {
    pub fn new(
        departure: DateTime<Utc>,
        actual_arrival: Option<DateTime<Utc>>,
        predicted_arrival: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            departure,
            actual_arrival,
            predicted_arrival,
        }
    }

    pub fn has_landed(&self) -> bool {
        self.actual_arrival.is_some()
    }

    /// Actual arrival when known, otherwise the prediction.
    pub fn arrival(&self) -> Option<DateTime<Utc>> {
        self.actual_arrival.or(self.predicted_arrival)
    }

    pub fn progress_at(&self, now: DateTime<Utc>, options: &ProgressOptions) -> f64 {
        journey_progress(self.departure, self.arrival(), self.has_landed(), now, options)
    }

    /// Duration label such as `"7h 5m"`; `None` without an arrival.
    pub fn duration_label(&self) -> Option<String> {
        self.arrival().map(|arrival| format_duration(self.departure, arrival))
    }

    /// Status suffix shown next to the arrival time.
    pub fn arrival_status(&self, options: &ProgressOptions) -> String {
        if self.has_landed() {
            format!("{} minutes early", options.early_minutes)
        } else {
            "estimated".to_string()
        }
    }
}

/// Completion percentage of a journey in `[0, 100]`.
///
/// A journey that has not landed never exceeds `options.unlanded_cap`,
/// however late it runs.
pub fn journey_progress(
    departure: DateTime<Utc>,
    arrival: Option<DateTime<Utc>>,
    has_landed: bool,
    now: DateTime<Utc>,
    options: &ProgressOptions,
) -> f64 {
    let Some(arrival) = arrival else {
        return 0.0;
    };

    let total_ms = (arrival - departure).num_milliseconds();
    if total_ms <= 0 {
        return 0.0;
    }

    let elapsed_ms = (now - departure).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0.0;
    }

    let raw = elapsed_ms as f64 / total_ms as f64 * 100.0;
    let capped = if has_landed {
        raw
    } else {
        raw.min(options.unlanded_cap)
    };

    capped.clamp(0.0, 100.0)
}

/// Formats the span between two instants as whole hours and minutes.
pub fn format_duration(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let total_minutes = (to - from).num_minutes();
    let hours = total_minutes.div_euclid(60);
    let minutes = total_minutes.rem_euclid(60);
    format!("{}h {}m", hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 18, 6, 0, 0).unwrap()
    }

    fn hours(h: f64) -> Duration {
        Duration::milliseconds((h * 3_600_000.0) as i64)
    }

    #[test]
    fn test_no_arrival_is_zero() {
        let progress = journey_progress(t0(), None, false, t0() + hours(3.0), &ProgressOptions::default());
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn test_non_positive_duration_is_zero() {
        let options = ProgressOptions::default();
        assert_eq!(journey_progress(t0(), Some(t0()), true, t0() + hours(1.0), &options), 0.0);
        assert_eq!(
            journey_progress(t0(), Some(t0() - hours(1.0)), true, t0() + hours(1.0), &options),
            0.0
        );
    }

    #[test]
    fn test_before_departure_is_zero() {
        let progress = journey_progress(
            t0(),
            Some(t0() + hours(10.0)),
            false,
            t0() - hours(1.0),
            &ProgressOptions::default(),
        );
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn test_midway() {
        let progress = journey_progress(
            t0(),
            Some(t0() + hours(10.0)),
            false,
            t0() + hours(5.0),
            &ProgressOptions::default(),
        );
        assert!((progress - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unlanded_capped_at_95() {
        let progress = journey_progress(
            t0(),
            Some(t0() + hours(10.0)),
            false,
            t0() + hours(9.7),
            &ProgressOptions::default(),
        );
        assert_eq!(progress, 95.0);
    }

    #[test]
    fn test_unlanded_overdue_still_capped() {
        let progress = journey_progress(
            t0(),
            Some(t0() + hours(10.0)),
            false,
            t0() + hours(30.0),
            &ProgressOptions::default(),
        );
        assert_eq!(progress, 95.0);
    }

    #[test]
    fn test_landed_after_arrival_is_full() {
        let progress = journey_progress(
            t0(),
            Some(t0() + hours(10.0)),
            true,
            t0() + hours(12.0),
            &ProgressOptions::default(),
        );
        assert_eq!(progress, 100.0);
    }

    #[test]
    fn test_custom_cap() {
        let options = ProgressOptions {
            unlanded_cap: 80.0,
            ..ProgressOptions::default()
        };
        let progress = journey_progress(t0(), Some(t0() + hours(10.0)), false, t0() + hours(9.0), &options);
        assert_eq!(progress, 80.0);
    }

    #[test]
    fn test_monotonic_over_journey() {
        let options = ProgressOptions::default();
        let arrival = t0() + hours(10.0);
        let mut last = 0.0;
        for step in 0..=100 {
            let now = t0() + Duration::minutes(step * 6);
            let progress = journey_progress(t0(), Some(arrival), false, now, &options);
            assert!(progress >= last, "progress went backwards at step {}", step);
            assert!(progress <= 95.0);
            last = progress;
        }
    }

    #[test]
    fn test_timing_resolves_arrival() {
        let predicted = t0() + hours(8.0);
        let actual = t0() + hours(7.5);

        let flying = JourneyTiming::new(t0(), None, Some(predicted));
        assert!(!flying.has_landed());
        assert_eq!(flying.arrival(), Some(predicted));

        let landed = JourneyTiming::new(t0(), Some(actual), Some(predicted));
        assert!(landed.has_landed());
        assert_eq!(landed.arrival(), Some(actual));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(t0(), t0() + Duration::minutes(425)), "7h 5m");
        assert_eq!(format_duration(t0(), t0() + Duration::minutes(59)), "0h 59m");
    }

    #[test]
    fn test_arrival_status() {
        let options = ProgressOptions::default();
        let landed = JourneyTiming::new(t0(), Some(t0() + hours(2.0)), None);
        let flying = JourneyTiming::new(t0(), None, Some(t0() + hours(2.0)));

        assert_eq!(landed.arrival_status(&options), "12 minutes early");
        assert_eq!(flying.arrival_status(&options), "estimated");
        assert_eq!(flying.duration_label().as_deref(), Some("2h 0m"));
    }
}
