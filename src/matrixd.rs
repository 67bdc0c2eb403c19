//! Application coordinator that manages the complete lifecycle of matrixd.
//!
//! This module handles resource acquisition, initialization, and
//! orchestration of the supervisor:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup
//! - Hardware adapter construction (real or mock for `--dry-run`)
//! - Controller wiring (buttons, UPS) and the startup sequence
//! - The main loop with the periodic watchdog sweep
//! - Graceful shutdown
//!
//! The `Matrixd` struct uses a builder pattern:
//! - Normal startup: `Matrixd::new(debug_enabled).run()`
//! - Without hardware: `Matrixd::new(debug_enabled).dry_run().run()`

use anyhow::{Context, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::{
    config,
    constants::{EXIT_FAILURE, MAIN_LOOP_ERROR_BACKOFF, MAIN_LOOP_TICK},
    controller::Controller,
    gpio::{cdev::CdevGpio, mock::MockGpio, Bias, Edge, GpioBackend, Relay},
    host::SystemHalt,
    lock,
    logger::{Log, LogLevel},
    service::SystemdUnit,
    signals::setup_signal_handler,
    ups::PowerLossMonitor,
};

/// Builder for configuring and running the matrixd supervisor.
pub struct Matrixd {
    debug_enabled: bool,
    dry_run: bool,
    config_path: Option<PathBuf>,
}

impl Matrixd {
    /// Create a runner with defaults matching a normal run.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            dry_run: false,
            config_path: None,
        }
    }

    /// Log actuator commands instead of executing them, and use the mock
    /// GPIO backend so no hardware is required.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Read configuration from an explicit file instead of the default
    /// search path.
    pub fn with_config_path(mut self, path: Option<String>) -> Self {
        self.config_path = path.map(PathBuf::from);
        self
    }

    /// Execute the supervisor with the configured settings.
    ///
    /// Handles the complete lifecycle: configuration, locking, signal
    /// handling, hardware setup, the safe-baseline startup sequence, the
    /// main loop, and graceful shutdown.
    pub fn run(self) -> Result<()> {
        log_version!();

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled - showing watchdog sweep details");
        }

        // Load and validate configuration first; nothing touches hardware
        // on a bad file.
        let config = match config::load(self.config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{:?}", e);
                std::process::exit(EXIT_FAILURE);
            }
        };

        // --debug wins over the configured level.
        if self.debug_enabled {
            Log::set_level(LogLevel::Debug);
        } else {
            Log::set_level(config.log_level());
        }

        // Single-instance enforcement: two supervisors must never share a relay.
        let _lock_file = match lock::acquire_lock()? {
            Some(file) => file,
            None => std::process::exit(EXIT_FAILURE),
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        log_block_start!("Initializing hardware...");
        let mut backend: Box<dyn GpioBackend> = if self.dry_run {
            log_decorated!("[dry-run] using mock GPIO backend");
            Box::new(MockGpio::new())
        } else {
            let chip = config.gpio_chip();
            let gpio = CdevGpio::open(chip)?;
            log_decorated!("Opened GPIO chip {}", chip);
            Box::new(gpio)
        };

        let relay = Relay::new(
            backend.as_mut(),
            config.relay_pin(),
            config.relay_active_high(),
        )
        .context("failed to initialize relay output")?;

        let service = SystemdUnit::new(config.service_unit(), self.dry_run);
        let halt = SystemHalt::new(self.dry_run);

        let controller = Arc::new(Controller::new(relay, Box::new(service), Box::new(halt)));

        // Known-safe baseline before any event can fire.
        controller.startup();

        // Button edges: with a pull-up the pressed transition is the line
        // falling to ground; wired the other way it is rising.
        let (button_edge, button_bias) = if config.buttons_pull_up() {
            (Edge::Falling, Bias::PullUp)
        } else {
            (Edge::Rising, Bias::PullDown)
        };

        let on_start = {
            let controller = Arc::clone(&controller);
            Box::new(move || controller.on_start_pressed())
        };
        backend
            .watch_edge(
                config.start_pin(),
                button_edge,
                button_bias,
                config.button_debounce(),
                "start-button",
                on_start,
            )
            .context("failed to register start button")?;

        let on_stop = {
            let controller = Arc::clone(&controller);
            Box::new(move || controller.on_stop_pressed())
        };
        backend
            .watch_edge(
                config.stop_pin(),
                button_edge,
                button_bias,
                config.button_debounce(),
                "stop-button",
                on_stop,
            )
            .context("failed to register stop button")?;

        let _ups_monitor = {
            let controller = Arc::clone(&controller);
            PowerLossMonitor::start(&config, backend.as_mut(), move || {
                controller.on_power_lost()
            })
            .context("failed to initialize UPS monitoring")?
        };

        let watchdog_interval = config.watchdog_interval();
        log_block_start!(
            "Supervisor ready - watchdog sweep every {} seconds",
            watchdog_interval.as_secs()
        );

        // Main loop: light sleep between run-flag checks, sweep on the
        // configured period. A panicking sweep is contained and retried
        // after a backoff; the daemon itself must not die.
        let mut last_sweep = Instant::now();
        while signal_state.running.load(Ordering::SeqCst) {
            if last_sweep.elapsed() >= watchdog_interval {
                let sweep = catch_unwind(AssertUnwindSafe(|| controller.on_watchdog_tick()));
                if sweep.is_err() {
                    log_error!("Watchdog sweep failed unexpectedly - backing off");
                    thread::sleep(MAIN_LOOP_ERROR_BACKOFF);
                }
                last_sweep = Instant::now();
            }
            thread::sleep(MAIN_LOOP_TICK);
        }

        controller.shutdown();
        log_end!();

        Ok(())
    }
}
