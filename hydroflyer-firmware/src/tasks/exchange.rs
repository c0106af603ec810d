//! Exchange task
//!
//! Drives one [`Exchanger`] cycle per period and publishes the results.
//! Cycles start on a fixed cadence measured from the previous start, so a
//! slow exchange eats into the idle time instead of shifting every later
//! cycle.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Instant, Timer};

use hydroflyer_core::exchange::{CycleReport, Exchanger, LinkError};
use hydroflyer_drivers::imu::Lis3dh;

use crate::channels::{COMMAND, LINK_STATS, MANEUVER, TELEMETRY};
use crate::transport::HttpTransport;

/// Exchanger wired to the board's accelerometer and Wi-Fi transport
pub type DashboardExchanger =
    Exchanger<Lis3dh<I2c<'static, I2C0, Async>>, HttpTransport<'static>, Delay>;

/// Exchange loop
#[embassy_executor::task]
pub async fn exchange_task(mut exchanger: DashboardExchanger, period_ms: u32) {
    info!(
        "Exchange task started (every {}ms, timeout {}ms)",
        period_ms,
        exchanger.timeout_ms()
    );

    let period = Duration::from_millis(period_ms as u64);
    let mut link_was_ok = false;

    // Initial values so readers never block on an empty watch
    TELEMETRY.sender().send(exchanger.telemetry());
    MANEUVER.sender().send(exchanger.maneuver());
    COMMAND.sender().send(exchanger.command());

    loop {
        let cycle_start = Instant::now();
        let report = exchanger.cycle().await;

        log_report(&report, link_was_ok);
        link_was_ok = report.link_ok();

        TELEMETRY.sender().send(exchanger.telemetry());
        MANEUVER.sender().send(exchanger.maneuver());
        COMMAND.sender().send(report.command);
        LINK_STATS.sender().send(*exchanger.stats());

        let elapsed = cycle_start.elapsed();
        if elapsed > period {
            trace!("Cycle overran: {}ms", elapsed.as_millis());
        }
        Timer::at(cycle_start + period).await;
    }
}

fn log_report(report: &CycleReport, link_was_ok: bool) {
    if let Some(e) = report.sensor_error {
        warn!("Tilt sensor read failed: {:?}", e);
    }

    match &report.link {
        Ok(failures) => {
            if !link_was_ok {
                info!("Vehicle link up");
            }
            if !failures.is_empty() {
                debug!("Telemetry fields kept previous value: {:#x}", failures.bits());
            }
        }
        Err(e) if link_was_ok => match e {
            LinkError::Transport(t) => warn!("Vehicle link down: {:?}", t),
            LinkError::MalformedTelemetry(m) => warn!("Vehicle link down: {:?}", m),
        },
        Err(e) => trace!("Exchange failed: {:?}", e),
    }

    if let Some(t) = report.transition {
        info!("Maneuver: {:?} -> {:?}", t.from, t.to);
    }
}
