//! Inter-task shared state
//!
//! Each value has exactly one writer task and is published as a whole
//! through a [`Watch`], so readers always see a complete snapshot and never
//! a half-updated record.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::Watch;

use hydroflyer_core::exchange::LinkStats;
use hydroflyer_core::position::OwnPosition;
use hydroflyer_core::state::ManeuverState;
use hydroflyer_drivers::gnss::FixReport;
use hydroflyer_protocol::{ControlCommand, TelemetryRecord};

/// Maximum receivers per value (the dashboard task)
const MAX_RECEIVERS: usize = 1;

/// Latest telemetry (written by the exchange task)
pub static TELEMETRY: Watch<CriticalSectionRawMutex, TelemetryRecord, MAX_RECEIVERS> =
    Watch::new();

/// Current maneuver (written by the exchange task)
pub static MANEUVER: Watch<CriticalSectionRawMutex, ManeuverState, MAX_RECEIVERS> = Watch::new();

/// Last command sent (written by the exchange task)
pub static COMMAND: Watch<CriticalSectionRawMutex, ControlCommand, MAX_RECEIVERS> = Watch::new();

/// Link counters (written by the exchange task)
pub static LINK_STATS: Watch<CriticalSectionRawMutex, LinkStats, MAX_RECEIVERS> = Watch::new();

/// Observer position (written by the position task)
pub static OWN_POSITION: Watch<CriticalSectionRawMutex, OwnPosition, MAX_RECEIVERS> =
    Watch::new();

/// Newest GGA/RMC report (written by the GNSS reader task)
pub static GNSS_REPORTS: Watch<CriticalSectionRawMutex, FixReport, MAX_RECEIVERS> =
    Watch::new();
