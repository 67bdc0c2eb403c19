//! Configuration validation.
//!
//! All range and consistency checks run before any hardware is opened, so a
//! bad file can never half-configure the supervisor.

use anyhow::{bail, Result};

use super::{Config, UpsMode};
use crate::constants::*;
use crate::logger::LogLevel;

/// Validate a loaded configuration.
///
/// Checks performed:
/// - debounce windows within `MINIMUM_DEBOUNCE_MS..=MAXIMUM_DEBOUNCE_MS`
/// - watchdog interval within its bounds
/// - `logging.level` parses to a known level
/// - all claimed pins are pairwise distinct (including the UPS pin when
///   UPS monitoring is enabled)
pub fn validate_config(config: &Config) -> Result<()> {
    let button_debounce = config
        .buttons
        .debounce_ms
        .unwrap_or(DEFAULT_BUTTON_DEBOUNCE_MS);
    check_debounce("buttons.debounce_ms", button_debounce)?;

    let ups_debounce = config.ups.debounce_ms.unwrap_or(DEFAULT_UPS_DEBOUNCE_MS);
    check_debounce("ups.debounce_ms", ups_debounce)?;

    let interval = config
        .watchdog
        .interval_secs
        .unwrap_or(DEFAULT_WATCHDOG_INTERVAL_SECS);
    if !(MINIMUM_WATCHDOG_INTERVAL_SECS..=MAXIMUM_WATCHDOG_INTERVAL_SECS).contains(&interval) {
        bail!(
            "watchdog.interval_secs must be between {} and {} (got {})",
            MINIMUM_WATCHDOG_INTERVAL_SECS,
            MAXIMUM_WATCHDOG_INTERVAL_SECS,
            interval
        );
    }

    if let Some(level) = config.logging.level.as_deref() {
        if LogLevel::parse(level).is_none() {
            bail!(
                "logging.level must be one of debug, info, warning, error (got {:?})",
                level
            );
        }
    }

    let mut pins = vec![
        ("buttons.start_pin", config.start_pin()),
        ("buttons.stop_pin", config.stop_pin()),
        ("relay.pin", config.relay_pin()),
    ];
    if config.ups_mode() == UpsMode::Gpio {
        pins.push(("ups.mains_lost_pin", config.ups_pin()));
    }
    for (i, (name_a, pin_a)) in pins.iter().enumerate() {
        for (name_b, pin_b) in &pins[i + 1..] {
            if pin_a == pin_b {
                bail!(
                    "{} and {} are both assigned GPIO{} - pins must be distinct",
                    name_a,
                    name_b,
                    pin_a
                );
            }
        }
    }

    Ok(())
}

fn check_debounce(name: &str, value: u64) -> Result<()> {
    if !(MINIMUM_DEBOUNCE_MS..=MAXIMUM_DEBOUNCE_MS).contains(&value) {
        bail!(
            "{} must be between {} and {} milliseconds (got {})",
            name,
            MINIMUM_DEBOUNCE_MS,
            MAXIMUM_DEBOUNCE_MS,
            value
        );
    }
    Ok(())
}
