//! Configuration system for matrixd.
//!
//! This module provides configuration management for the supervisor,
//! handling TOML-based configuration files, validation, and defaults.
//!
//! ## Configuration Sources
//!
//! The configuration file is resolved in order:
//! 1. The path given with `--config <file>`
//! 2. `/etc/matrixd/matrixd.toml` (the installed daemon)
//! 3. **XDG_CONFIG_HOME**/matrixd/matrixd.toml (development setups)
//!
//! A missing or unparsable file is a fatal startup error: the supervisor
//! must not guess pin numbers for physical hardware.
//!
//! ## Configuration Structure
//!
//! Every key is optional; defaults match the reference installation:
//!
//! ```toml
//! [buttons]
//! start_pin = 18           # GPIO of the start button (BCM numbering)
//! stop_pin = 19            # GPIO of the stop button
//! debounce_ms = 80         # Minimum level hold before an edge counts (10-5000)
//! pull_up = true           # true: pressed = falling edge; false: pressed = rising
//!
//! [relay]
//! pin = 20                 # GPIO driving the PSU relay
//! active_high = true       # false for active-low relay boards
//!
//! [gpio]
//! chip = "gpiochip4"       # GPIO character device (gpiochip4 on the Pi 5)
//!
//! [ups]
//! mode = "disabled"        # "disabled" | "gpio"
//! mains_lost_pin = 21      # GPIO of the mains-lost signal (gpio mode)
//! edge = "rising"          # Edge signalling power loss: "rising" | "falling"
//! debounce_ms = 300        # Noise rejection window (10-5000)
//!
//! [service]
//! unit = "matrix-led.service"
//!
//! [watchdog]
//! interval_secs = 5        # Seconds between consistency sweeps (1-3600)
//!
//! [logging]
//! level = "info"           # "debug" | "info" | "warning" | "error"
//! ```

pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::time::Duration;

use crate::constants::*;
use crate::gpio::Edge;
use crate::logger::LogLevel;

// Re-export public API
pub use loading::{load, load_from_path, resolve_config_path};

/// Source of the power-loss signal.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpsMode {
    /// No UPS wired; power-loss handling is inert.
    Disabled,
    /// Watch a GPIO line for the mains-lost edge.
    Gpio,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct ButtonsConfig {
    pub start_pin: Option<u32>,
    pub stop_pin: Option<u32>,
    pub debounce_ms: Option<u64>,
    pub pull_up: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct RelayConfig {
    pub pin: Option<u32>,
    pub active_high: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct GpioConfig {
    pub chip: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct UpsConfig {
    pub mode: Option<UpsMode>,
    pub mains_lost_pin: Option<u32>,
    pub edge: Option<Edge>,
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct ServiceConfig {
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct WatchdogConfig {
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Configuration structure for matrixd settings.
///
/// All fields are optional and use the defaults from [`crate::constants`]
/// when not specified. Values are validated during loading so the accessors
/// below can assume well-formed content.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub buttons: ButtonsConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub ups: UpsConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn start_pin(&self) -> u32 {
        self.buttons.start_pin.unwrap_or(DEFAULT_START_PIN)
    }

    pub fn stop_pin(&self) -> u32 {
        self.buttons.stop_pin.unwrap_or(DEFAULT_STOP_PIN)
    }

    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.buttons.debounce_ms.unwrap_or(DEFAULT_BUTTON_DEBOUNCE_MS))
    }

    pub fn buttons_pull_up(&self) -> bool {
        self.buttons.pull_up.unwrap_or(DEFAULT_BUTTONS_PULL_UP)
    }

    pub fn relay_pin(&self) -> u32 {
        self.relay.pin.unwrap_or(DEFAULT_RELAY_PIN)
    }

    pub fn relay_active_high(&self) -> bool {
        self.relay.active_high.unwrap_or(DEFAULT_RELAY_ACTIVE_HIGH)
    }

    pub fn gpio_chip(&self) -> &str {
        self.gpio.chip.as_deref().unwrap_or(DEFAULT_GPIO_CHIP)
    }

    pub fn ups_mode(&self) -> UpsMode {
        self.ups.mode.unwrap_or(UpsMode::Disabled)
    }

    pub fn ups_pin(&self) -> u32 {
        self.ups.mains_lost_pin.unwrap_or(DEFAULT_UPS_PIN)
    }

    pub fn ups_edge(&self) -> Edge {
        self.ups.edge.unwrap_or(Edge::Rising)
    }

    pub fn ups_debounce(&self) -> Duration {
        Duration::from_millis(self.ups.debounce_ms.unwrap_or(DEFAULT_UPS_DEBOUNCE_MS))
    }

    pub fn service_unit(&self) -> &str {
        self.service.unit.as_deref().unwrap_or(DEFAULT_SERVICE_UNIT)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(
            self.watchdog
                .interval_secs
                .unwrap_or(DEFAULT_WATCHDOG_INTERVAL_SECS),
        )
    }

    /// Configured minimum log level. Validation guarantees the string parses.
    pub fn log_level(&self) -> LogLevel {
        self.logging
            .level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Info)
    }

    /// Echo the effective configuration to the log.
    pub fn log_config(&self) {
        let pull = if self.buttons_pull_up() { "up" } else { "down" };
        log_indented!(
            "Buttons: start=GPIO{} stop=GPIO{} (debounce {} ms, pull-{})",
            self.start_pin(),
            self.stop_pin(),
            self.button_debounce().as_millis(),
            pull
        );

        let polarity = if self.relay_active_high() {
            "active-high"
        } else {
            "active-low"
        };
        log_indented!("Relay: GPIO{} ({})", self.relay_pin(), polarity);
        log_indented!("GPIO chip: {}", self.gpio_chip());

        match self.ups_mode() {
            UpsMode::Disabled => log_indented!("UPS monitoring: disabled"),
            UpsMode::Gpio => log_indented!(
                "UPS monitoring: GPIO{} on {} edge (debounce {} ms)",
                self.ups_pin(),
                self.ups_edge().as_str(),
                self.ups_debounce().as_millis()
            ),
        }

        log_indented!("Render service: {}", self.service_unit());
        log_indented!(
            "Watchdog interval: {} seconds",
            self.watchdog_interval().as_secs()
        );
        log_indented!(
            "Log level: {}",
            self.logging.level.as_deref().unwrap_or("info")
        );
    }
}
