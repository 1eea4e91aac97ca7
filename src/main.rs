//! CellOTA Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartLink      MonotonicClock  FsImageStore   FileConfigStore  │
//! │  (SerialLink)  (Clock+Delay)   (ImageStore)   (ConfigPort)     │
//! │  BlinkLed      EspSystem       LogEventSink                    │
//! │  (Indicator)   (SystemControl) (EventSink)                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  OtaService → OtaUpdater → HttpSession → Channel       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use cellota::adapters::config_file::{FileConfigStore, CONFIG_PATH};
use cellota::adapters::device_id;
use cellota::adapters::fs_store::{self, FsImageStore};
use cellota::adapters::log_sink::LogEventSink;
use cellota::adapters::system::EspSystem;
use cellota::adapters::time::MonotonicClock;
use cellota::adapters::uart::{UartLink, MODEM_BAUD};
use cellota::app::ports::StatusIndicator;
use cellota::app::service::OtaService;
use cellota::config::OtaConfig;
use cellota::drivers::led_patterns::Pattern;
use cellota::drivers::modem_power;
use cellota::drivers::status_led::BlinkLed;
use cellota::modem::channel::CommandChannel;
use cellota::modem::setup;
use cellota::ota::lifecycle::OtaUpdater;

/// Pause between error renderings when the modem never came up.
const HALT_BLINK_PAUSE_MS: u32 = 2000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CellOTA v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Storage and config ─────────────────────────────────
    if let Err(e) = fs_store::mount_storage() {
        warn!("Storage mount failed ({}); updates cannot be applied", e);
    }
    let config = match FileConfigStore::new(CONFIG_PATH).load_or_default() {
        Ok(c) => c,
        Err(e) => {
            warn!("Config load failed ({}), running with defaults", e);
            OtaConfig::default()
        }
    };

    // ── 3. Board peripherals ──────────────────────────────────
    // Pins: status LED GPIO2, modem enable GPIO14, modem UART1 TX 17 / RX 18.
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let mut led = BlinkLed::new(PinDriver::output(pins.gpio2)?, FreeRtos);

    // The enable line must stay driven for as long as the modem runs.
    let mut modem_enable = PinDriver::output(pins.gpio14)?;
    if let Err(e) = modem_power::power_on(&mut modem_enable, &mut FreeRtos) {
        error!("Modem power-on failed: {}", e);
    }

    let uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(MODEM_BAUD)),
    )?;
    let mut channel = CommandChannel::new(UartLink::new(uart), MonotonicClock::new(), &config);

    // ── 4. Modem bring-up ─────────────────────────────────────
    if let Err(e) = setup::bring_up(&mut channel, &config) {
        error!("Modem initialisation failed: {}; halting", e);
        loop {
            led.signal(Pattern::Error);
            FreeRtos::delay_ms(HALT_BLINK_PAUSE_MS);
        }
    }

    // ── 5. Service loop ───────────────────────────────────────
    let identity = device_id::identity();
    let store = FsImageStore::from_config(&config);
    let tick_period_ms = config.tick_period_ms;
    let updater = OtaUpdater::new(channel, store, led, EspSystem::new(), identity, config);
    let mut service = OtaService::new(updater);
    let mut sink = LogEventSink::new();

    service.start(&mut sink);
    loop {
        service.tick(&mut sink);
        FreeRtos::delay_ms(tick_period_ms);
    }
}
