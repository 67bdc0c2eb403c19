//! UPS power-loss monitoring.
//!
//! Wraps one debounced GPIO input: when mains power fails, the UPS asserts
//! its signal line and the configured edge fires the supplied callback.
//! The debounce window is deliberately long (300 ms by default) because a
//! false trigger halts the host.

use anyhow::Result;

use crate::config::{Config, UpsMode};
use crate::gpio::{Bias, Edge, GpioBackend};

/// Power-loss monitor handle.
///
/// Mostly a witness that wiring succeeded; the actual edge watching lives
/// in the backend's monitor thread for the line.
pub struct PowerLossMonitor {
    pin: u32,
    edge: Edge,
}

impl PowerLossMonitor {
    /// Wire up power-loss monitoring according to the configuration.
    ///
    /// Returns `Ok(None)` when UPS monitoring is disabled.
    pub fn start(
        config: &Config,
        backend: &mut dyn GpioBackend,
        callback: impl Fn() + Send + 'static,
    ) -> Result<Option<Self>> {
        match config.ups_mode() {
            UpsMode::Disabled => {
                log_decorated!("UPS monitoring disabled");
                Ok(None)
            }
            UpsMode::Gpio => {
                let pin = config.ups_pin();
                let edge = config.ups_edge();
                // Bias the line toward its resting level so a disconnected
                // UPS cannot float into the trigger edge.
                let bias = match edge {
                    Edge::Rising => Bias::PullDown,
                    Edge::Falling => Bias::PullUp,
                };
                backend.watch_edge(
                    pin,
                    edge,
                    bias,
                    config.ups_debounce(),
                    "ups",
                    Box::new(callback),
                )?;
                log_decorated!("UPS monitoring enabled: GPIO{} on {} edge", pin, edge.as_str());
                Ok(Some(Self { pin, edge }))
            }
        }
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::mock::MockGpio;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gpio_config(edge: &str) -> Config {
        toml::from_str(&format!(
            "[ups]\nmode = \"gpio\"\nmains_lost_pin = 21\nedge = \"{edge}\"\n"
        ))
        .unwrap()
    }

    #[test]
    fn disabled_mode_registers_nothing() {
        crate::logger::Log::set_enabled(false);
        let config = Config::default();
        let mut backend = MockGpio::new();
        let monitor = PowerLossMonitor::start(&config, &mut backend, || {}).unwrap();
        crate::logger::Log::set_enabled(true);

        assert!(monitor.is_none());
        assert_eq!(backend.watcher_count(), 0);
    }

    #[test]
    fn gpio_mode_fires_callback_on_edge() {
        crate::logger::Log::set_enabled(false);
        let config = gpio_config("rising");
        let mut backend = MockGpio::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&hits);

        let monitor = PowerLossMonitor::start(&config, &mut backend, move || {
            counted.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
        .expect("monitor should be active");
        crate::logger::Log::set_enabled(true);

        assert_eq!(monitor.pin(), 21);
        assert_eq!(monitor.edge(), Edge::Rising);

        backend.trigger(21);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
