//! Consumer-facing dashboard state
//!
//! The rendering consumer reads one [`DashboardSnapshot`] per UI tick and
//! derives the discrete status [`Indicators`] from it. [`IndicatorTracker`]
//! hands back indicators only when one of them changed, so a renderer can
//! redraw on change instead of on every tick.

use hydroflyer_protocol::{ControlCommand, TelemetryRecord};

use crate::position::OwnPosition;
use crate::state::ManeuverState;
use crate::traits::GeoPosition;

/// Everything the consumer reads on one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DashboardSnapshot {
    pub telemetry: TelemetryRecord,
    pub maneuver: ManeuverState,
    pub own_position: OwnPosition,
    pub command: ControlCommand,
}

impl DashboardSnapshot {
    /// Discrete status indicators for this snapshot
    pub fn indicators(&self) -> Indicators {
        Indicators {
            link_ok: self.telemetry.link_ok,
            gps_fix: self.telemetry.gps_fix_valid(),
            leak: self.telemetry.leak_detected(),
            on_water: self.telemetry.on_water(),
            maneuver: self.maneuver,
        }
    }

    /// Vehicle position, if the vehicle reports a GPS fix
    pub fn vehicle_position(&self) -> Option<GeoPosition> {
        self.telemetry.gps_fix_valid().then(|| {
            GeoPosition::new(self.telemetry.latitude, self.telemetry.longitude)
        })
    }

    /// Map rotation in degrees (the vehicle's heading)
    pub fn map_heading(&self) -> u32 {
        self.telemetry.heading
    }
}

/// Discrete status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators {
    /// Last exchange completed and parsed
    pub link_ok: bool,
    /// Vehicle GPS has a fix
    pub gps_fix: bool,
    /// Leak detector reads wet
    pub leak: bool,
    /// Hull is on water
    pub on_water: bool,
    /// Current maneuver
    pub maneuver: ManeuverState,
}

/// Reports indicator changes
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorTracker {
    last: Option<Indicators>,
}

impl IndicatorTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Feed a snapshot; returns the indicators if they differ from the
    /// previous call (always on the first call)
    pub fn update(&mut self, snapshot: &DashboardSnapshot) -> Option<Indicators> {
        let indicators = snapshot.indicators();
        if self.last == Some(indicators) {
            return None;
        }
        self.last = Some(indicators);
        Some(indicators)
    }

    /// Indicators from the last change
    pub fn last(&self) -> Option<Indicators> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked() -> DashboardSnapshot {
        let telemetry = TelemetryRecord::new()
            .decode("31|21.201395|72.788782|187|40|600")
            .unwrap()
            .record;
        DashboardSnapshot {
            telemetry,
            maneuver: ManeuverState::Forward,
            ..Default::default()
        }
    }

    #[test]
    fn test_indicators_from_snapshot() {
        let indicators = linked().indicators();
        assert!(indicators.link_ok);
        assert!(indicators.gps_fix);
        assert!(!indicators.leak);
        assert!(indicators.on_water);
        assert_eq!(indicators.maneuver, ManeuverState::Forward);
    }

    #[test]
    fn test_vehicle_position_requires_fix() {
        let snapshot = linked();
        assert_eq!(
            snapshot.vehicle_position(),
            Some(GeoPosition::new(21.201395, 72.788782))
        );
        assert_eq!(snapshot.map_heading(), 187);

        let mut no_fix = snapshot;
        no_fix.telemetry.gps_validity_code = 0;
        assert_eq!(no_fix.vehicle_position(), None);
    }

    #[test]
    fn test_tracker_reports_changes_only() {
        let mut tracker = IndicatorTracker::new();
        let snapshot = linked();

        assert!(tracker.update(&snapshot).is_some());
        assert!(tracker.update(&snapshot).is_none());

        // Heading alone is not an indicator
        let mut turned = snapshot;
        turned.telemetry.heading = 10;
        assert!(tracker.update(&turned).is_none());

        let lost = DashboardSnapshot {
            telemetry: snapshot.telemetry.with_link_lost(),
            ..snapshot
        };
        let changed = tracker.update(&lost).unwrap();
        assert!(!changed.link_ok);
        assert_eq!(tracker.last(), Some(changed));
    }

    #[test]
    fn test_default_snapshot_is_unlinked_and_stopped() {
        let snapshot = DashboardSnapshot::default();
        let indicators = snapshot.indicators();
        assert!(!indicators.link_ok);
        assert_eq!(indicators.maneuver, ManeuverState::Stopped);
        assert!(!snapshot.own_position.has_fix);
        assert_eq!(snapshot.command, ControlCommand::neutral());
    }
}
