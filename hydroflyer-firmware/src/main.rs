//! Hydroflyer - Handheld Dashboard Firmware
//!
//! Firmware for the RP2040 + CYW43 (Pico W) handheld that steers a
//! Hydroflyer vehicle by tilt and shows what the vehicle reports back.
//!
//! Tasks:
//! - exchange: tilt -> command -> HTTP exchange -> telemetry, every 40ms
//! - gnss / position: own position from the on-board GNSS receiver
//! - dashboard: snapshot assembly and status indicators
//! - wifi / net / cyw43: link to the vehicle's access point

#![no_std]
#![no_main]

use cyw43::aligned_bytes;
use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Config as I2cConfig, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::{I2C0, PIO0, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Instant};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hydroflyer_core::config::DashboardConfig;
use hydroflyer_core::exchange::Exchanger;
use hydroflyer_core::position::{OwnPosition, PositionRefresher};
use hydroflyer_drivers::gnss::{LatestFix, NmeaReceiver};
use hydroflyer_drivers::imu::{Lis3dh, ADDR_SDO_LOW};

use crate::transport::HttpTransport;

mod channels;
mod config;
mod tasks;
mod transport;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// GNSS modules ship configured for 9600 baud
const GNSS_BAUD: u32 = 9600;

/// Accelerometer bus speed
const I2C_FREQUENCY: u32 = 400_000;

// Static cells (must live forever for task references)
static CONFIG: StaticCell<DashboardConfig> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
static GNSS_TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static GNSS_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hydroflyer dashboard starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DashboardConfig = CONFIG.init(config::load_config());

    // Radio: CYW43 on the Pico W's PIO-driven SPI bus
    // Firmware and NVRAM blobs must be 4-byte aligned for DMA
    let fw = aligned_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = aligned_bytes!("../cyw43-firmware/43439A0_clm.bin");
    let nvram = aligned_bytes!("../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        RM2_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw, nvram).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    // Network stack: the vehicle's access point hands out the address
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let seed = Instant::now().as_ticks() ^ 0x4859_4452_4f46_4c59;
    let (stack, net_runner) = embassy_net::new(
        net_device,
        net_config,
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(net_runner)).unwrap();
    spawner
        .spawn(tasks::wifi_task(control, stack, &config.wifi))
        .unwrap();
    info!("Network stack initialized");

    // Accelerometer on I2C0 (GPIO4 SDA, GPIO5 SCL)
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    let mut accel = Lis3dh::new(i2c, ADDR_SDO_LOW);
    match accel.init().await {
        Ok(()) => info!("LIS3DH initialized"),
        // Cycles reuse the previous tilt bytes and count the failure
        Err(e) => warn!("LIS3DH init failed: {:?}", e),
    }

    // GNSS receiver on UART0 (GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = GNSS_BAUD;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(
        Irqs,
        GNSS_TX_BUF.init([0u8; 16]),
        GNSS_RX_BUF.init([0u8; 256]),
    );
    let (_gnss_tx, gnss_rx) = uart.split();
    info!("GNSS UART initialized");

    let Some(transport) = HttpTransport::new(stack, &config.vehicle) else {
        error!("Vehicle host is not an IPv4 address");
        return;
    };

    let exchanger = Exchanger::new(accel, transport, Delay, config.exchange.timeout_ms);
    let Some(gnss_reports) = channels::GNSS_REPORTS.receiver() else {
        error!("GNSS report watch has no free receiver");
        return;
    };
    let refresher = PositionRefresher::new(
        LatestFix::new(gnss_reports),
        Delay,
        config.position.timeout_ms,
        OwnPosition::initial(config.position.default_position()),
    );

    // Spawn tasks
    spawner
        .spawn(tasks::exchange_task(exchanger, config.exchange.period_ms))
        .unwrap();
    spawner
        .spawn(tasks::gnss_task(NmeaReceiver::new(gnss_rx)))
        .unwrap();
    spawner
        .spawn(tasks::position_task(refresher, config.position.period_ms))
        .unwrap();
    spawner
        .spawn(tasks::dashboard_task(config.ui.refresh_ms))
        .unwrap();

    info!("All tasks spawned, dashboard running");
}
