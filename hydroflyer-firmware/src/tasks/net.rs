//! Radio and network stack tasks
//!
//! The CYW43 runner and the embassy-net runner each need their own task
//! that never returns. Joining the vehicle's access point lives in
//! [`wifi_task`], which owns the radio's control handle.

use defmt::*;
use embassy_net::Stack;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{Duration, Timer};

use cyw43::JoinOptions;
use cyw43_pio::PioSpi;

use hydroflyer_core::config::WifiConfig;

/// PIO-driven SPI bus between the RP2040 and the CYW43
pub type Cyw43Spi = PioSpi<'static, PIO0, 0, DMA_CH0>;

/// Pause between failed join attempts
const REJOIN_DELAY: Duration = Duration::from_secs(2);

/// How often the link is checked once joined
const LINK_POLL: Duration = Duration::from_secs(1);

/// CYW43 bus runner
#[embassy_executor::task]
pub async fn cyw43_task(runner: cyw43::Runner<'static, Output<'static>, Cyw43Spi>) -> ! {
    runner.run().await
}

/// embassy-net stack runner
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Join the vehicle's access point and rejoin whenever the link drops
///
/// Exchanges fail with a connect error while the link is down; the
/// exchange loop reports those as link loss and keeps running.
#[embassy_executor::task]
pub async fn wifi_task(
    mut control: cyw43::Control<'static>,
    stack: Stack<'static>,
    config: &'static WifiConfig,
) -> ! {
    info!("Wi-Fi task started");

    loop {
        let options = if config.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(config.password.as_bytes())
        };

        info!("Joining {}", config.ssid.as_str());
        if let Err(e) = control.join(config.ssid.as_str(), options).await {
            warn!("Join failed: status={}", e.status);
            Timer::after(REJOIN_DELAY).await;
            continue;
        }

        stack.wait_config_up().await;
        if let Some(v4) = stack.config_v4() {
            info!("Joined, address {}", v4.address);
        }

        while stack.is_link_up() {
            Timer::after(LINK_POLL).await;
        }

        warn!("Wi-Fi link lost, rejoining");
        control.leave().await;
    }
}
