//! Own-position tasks
//!
//! The GNSS reader drains the UART continuously and publishes every
//! position report. The refresh loop picks up the newest one on its own
//! cadence; a failed refresh leaves the published position untouched.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Duration, Instant, Timer};

use hydroflyer_core::position::PositionRefresher;
use hydroflyer_core::traits::LocationError;
use hydroflyer_drivers::gnss::{LatestFix, NmeaReceiver};

use crate::channels::{GNSS_REPORTS, OWN_POSITION};

/// Refresher fed by the GNSS reader task
pub type GnssRefresher = PositionRefresher<LatestFix<'static, CriticalSectionRawMutex, 1>, Delay>;

/// Pause after a UART error (overrun, break) before reading again
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// GNSS reader loop
#[embassy_executor::task]
pub async fn gnss_task(mut gnss: NmeaReceiver<BufferedUartRx>) {
    info!("GNSS task started");

    let sender = GNSS_REPORTS.sender();
    loop {
        if gnss.publish_next(&sender).await.is_err() {
            debug!("GNSS read error, partial sentence dropped");
            Timer::after(READ_ERROR_BACKOFF).await;
        }
    }
}

/// Position refresh loop
#[embassy_executor::task]
pub async fn position_task(mut refresher: GnssRefresher, period_ms: u32) {
    info!("Position task started (every {}ms)", period_ms);

    let period = Duration::from_millis(period_ms as u64);
    OWN_POSITION.sender().send(refresher.position());

    loop {
        let cycle_start = Instant::now();

        match refresher.refresh().await {
            Ok(position) => {
                debug!(
                    "Own position: {}, {}",
                    position.latitude, position.longitude
                );
                OWN_POSITION.sender().send(position);
            }
            Err(LocationError::NoFix) => debug!("GNSS has no fix yet"),
            Err(e) => warn!("Position refresh failed: {:?}", e),
        }

        let stats = refresher.stats();
        trace!(
            "Position stats: {} attempts, {} fixes, {} timeouts",
            stats.attempts,
            stats.fixes,
            stats.timeouts
        );

        Timer::at(cycle_start + period).await;
    }
}
