//! Digital I/O adapter boundary.
//!
//! The supervisor touches hardware through the [`GpioBackend`] trait:
//! claiming an output line (the relay) and watching input lines for
//! debounced edges (buttons, UPS signal). Two implementations exist:
//!
//! - [`cdev::CdevGpio`]: the Linux GPIO character device, one shared chip
//!   handle for the whole process
//! - [`mock::MockGpio`]: an in-memory backend for `--dry-run` and tests
//!
//! Relay polarity is handled in software by [`Relay`], so backends only see
//! raw line levels.

pub mod cdev;
pub mod mock;

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Edge direction of a digital input transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Rising => "rising",
            Edge::Falling => "falling",
        }
    }
}

/// Bias resistor applied to an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Disabled,
    PullUp,
    PullDown,
}

/// Callback invoked on each accepted (debounced) edge.
pub type EdgeCallback = Box<dyn Fn() + Send + 'static>;

/// A claimed output line.
pub trait OutputLine: Send {
    /// Drive the line to the given level.
    fn write(&mut self, value: bool) -> Result<()>;
    /// Read back the currently driven level.
    fn read(&self) -> Result<bool>;
}

/// Process-wide digital I/O handle.
pub trait GpioBackend: Send {
    /// Claim `pin` as an output driven to `initial`.
    fn claim_output(&mut self, pin: u32, initial: bool) -> Result<Box<dyn OutputLine>>;

    /// Watch `pin` for `edge` transitions and invoke `callback` on each
    /// accepted edge. Edges arriving within `debounce` of an accepted one
    /// are discarded as bounce. `label` names the monitor in logs and
    /// thread names.
    fn watch_edge(
        &mut self,
        pin: u32,
        edge: Edge,
        bias: Bias,
        debounce: Duration,
        label: &str,
        callback: EdgeCallback,
    ) -> Result<()>;
}

/// The PSU relay: an output line plus its active-high/low polarity.
///
/// The logical "on"/"off" commanded here is what the watchdog compares
/// against; `is_on` reads the line back rather than caching.
pub struct Relay {
    line: Box<dyn OutputLine>,
    active_high: bool,
}

impl Relay {
    /// Claim the relay pin, driven to OFF.
    pub fn new(backend: &mut dyn GpioBackend, pin: u32, active_high: bool) -> Result<Self> {
        // OFF is the inactive level for the configured polarity
        let line = backend.claim_output(pin, !active_high)?;
        Ok(Self { line, active_high })
    }

    /// Wrap an already claimed line (used by tests).
    pub fn from_line(line: Box<dyn OutputLine>, active_high: bool) -> Self {
        Self { line, active_high }
    }

    /// Command the relay on or off.
    pub fn set(&mut self, on: bool) -> Result<()> {
        self.line.write(on == self.active_high)?;
        log_decorated!("Relay switched {}", if on { "ON" } else { "OFF" });
        Ok(())
    }

    /// Whether the relay is currently commanded on.
    pub fn is_on(&self) -> Result<bool> {
        Ok(self.line.read()? == self.active_high)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGpio;
    use super::*;

    #[test]
    fn relay_applies_active_high_polarity() {
        let mut backend = MockGpio::new();
        let mut relay = Relay::new(&mut backend, 20, true).unwrap();

        assert_eq!(backend.output_level(20), Some(false));
        assert!(!relay.is_on().unwrap());

        relay.set(true).unwrap();
        assert_eq!(backend.output_level(20), Some(true));
        assert!(relay.is_on().unwrap());
    }

    #[test]
    fn relay_applies_active_low_polarity() {
        let mut backend = MockGpio::new();
        let mut relay = Relay::new(&mut backend, 20, false).unwrap();

        // OFF means the line rests high for an active-low board.
        assert_eq!(backend.output_level(20), Some(true));
        assert!(!relay.is_on().unwrap());

        relay.set(true).unwrap();
        assert_eq!(backend.output_level(20), Some(false));
        assert!(relay.is_on().unwrap());
    }
}
