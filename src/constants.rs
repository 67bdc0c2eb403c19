//! Default values and limits shared across the application.
//!
//! The defaults match the wiring of the reference installation: momentary
//! push-buttons on GPIO 18/19 against ground, the PSU relay on GPIO 20, and
//! the UPS mains-lost signal on GPIO 21.

use std::time::Duration;

/// GPIO pin of the start button (BCM numbering).
pub const DEFAULT_START_PIN: u32 = 18;
/// GPIO pin of the stop button (BCM numbering).
pub const DEFAULT_STOP_PIN: u32 = 19;
/// GPIO pin driving the PSU relay.
pub const DEFAULT_RELAY_PIN: u32 = 20;
/// GPIO pin carrying the UPS mains-lost signal.
pub const DEFAULT_UPS_PIN: u32 = 21;

/// Buttons are wired to ground with the internal pull-up by default.
pub const DEFAULT_BUTTONS_PULL_UP: bool = true;
/// Minimum time a button level must hold before an edge counts.
pub const DEFAULT_BUTTON_DEBOUNCE_MS: u64 = 80;
/// The UPS line uses a longer window to reject electrical noise.
pub const DEFAULT_UPS_DEBOUNCE_MS: u64 = 300;

/// Relay boards for mains switching are usually active-high.
pub const DEFAULT_RELAY_ACTIVE_HIGH: bool = true;

/// GPIO character device of the Raspberry Pi 5 header.
pub const DEFAULT_GPIO_CHIP: &str = "gpiochip4";

/// systemd unit rendering to the matrix.
pub const DEFAULT_SERVICE_UNIT: &str = "matrix-led.service";

/// Seconds between consistency sweeps.
pub const DEFAULT_WATCHDOG_INTERVAL_SECS: u64 = 5;

/// Minimum allowed debounce window (milliseconds).
pub const MINIMUM_DEBOUNCE_MS: u64 = 10;
/// Maximum allowed debounce window (milliseconds).
pub const MAXIMUM_DEBOUNCE_MS: u64 = 5_000;
/// Minimum allowed watchdog interval (seconds).
pub const MINIMUM_WATCHDOG_INTERVAL_SECS: u64 = 1;
/// Maximum allowed watchdog interval (seconds).
pub const MAXIMUM_WATCHDOG_INTERVAL_SECS: u64 = 3_600;

/// Upper bound for `systemctl start`.
pub const SERVICE_START_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for `systemctl stop`.
pub const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for `systemctl is-active`.
pub const SERVICE_STATUS_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound for the host halt command.
pub const HALT_TIMEOUT: Duration = Duration::from_secs(5);

/// Main loop sleep between run-flag checks.
pub const MAIN_LOOP_TICK: Duration = Duration::from_millis(100);
/// Pause after an unexpected failure in the main loop body.
pub const MAIN_LOOP_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Exit code for fatal startup failures.
pub const EXIT_FAILURE: i32 = 1;
