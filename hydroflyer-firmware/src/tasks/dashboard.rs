//! Dashboard consumer task
//!
//! Assembles a [`DashboardSnapshot`] from the latest published values on
//! every UI tick. The handheld has no display attached, so indicator
//! changes go to the log.

use defmt::*;
use embassy_time::{Duration, Ticker};

use hydroflyer_core::dashboard::{DashboardSnapshot, IndicatorTracker};

use crate::channels::{COMMAND, LINK_STATS, MANEUVER, OWN_POSITION, TELEMETRY};

/// Log link statistics every this many ticks
const STATS_EVERY_TICKS: u32 = 250;

/// Dashboard refresh loop
#[embassy_executor::task]
pub async fn dashboard_task(refresh_ms: u32) {
    info!("Dashboard task started (every {}ms)", refresh_ms);

    let Some(mut telemetry) = TELEMETRY.receiver() else {
        error!("Telemetry watch has no free receiver");
        return;
    };
    let Some(mut maneuver) = MANEUVER.receiver() else {
        error!("Maneuver watch has no free receiver");
        return;
    };
    let Some(mut command) = COMMAND.receiver() else {
        error!("Command watch has no free receiver");
        return;
    };
    let Some(mut own_position) = OWN_POSITION.receiver() else {
        error!("Position watch has no free receiver");
        return;
    };
    let Some(mut link_stats) = LINK_STATS.receiver() else {
        error!("Link stats watch has no free receiver");
        return;
    };

    let mut snapshot = DashboardSnapshot::default();
    let mut tracker = IndicatorTracker::new();
    let mut ticker = Ticker::every(Duration::from_millis(refresh_ms as u64));
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;
        ticks = ticks.wrapping_add(1);

        if let Some(t) = telemetry.try_get() {
            snapshot.telemetry = t;
        }
        if let Some(m) = maneuver.try_get() {
            snapshot.maneuver = m;
        }
        if let Some(c) = command.try_get() {
            snapshot.command = c;
        }
        if let Some(p) = own_position.try_get() {
            snapshot.own_position = p;
        }

        if let Some(indicators) = tracker.update(&snapshot) {
            info!(
                "Status: link={} gps={} leak={} water={} maneuver={:?}",
                indicators.link_ok,
                indicators.gps_fix,
                indicators.leak,
                indicators.on_water,
                indicators.maneuver
            );
            if indicators.leak {
                warn!("Leak detected on vehicle");
            }
        }

        if ticks % STATS_EVERY_TICKS == 0 {
            if let Some(stats) = link_stats.try_get() {
                info!(
                    "Link: {}% ok over {} exchanges, {} timeouts",
                    stats.success_percent(),
                    stats.exchanges,
                    stats.timeouts
                );
            }
            match snapshot.vehicle_position() {
                Some(v) => debug!(
                    "Vehicle at {}, {} heading {}",
                    v.latitude,
                    v.longitude,
                    snapshot.map_heading()
                ),
                None => debug!("Vehicle position unknown"),
            }
        }
    }
}
