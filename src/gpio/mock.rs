//! In-memory GPIO backend for `--dry-run` and tests.
//!
//! Output levels are held in a shared map that tests can inspect, and
//! registered edge watchers can be fired manually with [`MockGpio::trigger`].
//! Debounce is not simulated; callers exercise timing against real hardware.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Bias, Edge, EdgeCallback, GpioBackend, OutputLine};

type PinLevels = Arc<Mutex<HashMap<u32, bool>>>;

struct Watcher {
    pin: u32,
    callback: EdgeCallback,
}

/// Mock digital I/O backend.
#[derive(Default)]
pub struct MockGpio {
    levels: PinLevels,
    watchers: Arc<Mutex<Vec<Watcher>>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of a claimed output pin, if any.
    pub fn output_level(&self, pin: u32) -> Option<bool> {
        self.levels.lock().unwrap().get(&pin).copied()
    }

    /// Fire every watcher registered on `pin`, as if a debounced edge
    /// arrived from the hardware.
    pub fn trigger(&self, pin: u32) {
        let watchers = self.watchers.lock().unwrap();
        for watcher in watchers.iter().filter(|w| w.pin == pin) {
            (watcher.callback)();
        }
    }

    /// Number of registered edge watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().unwrap().len()
    }
}

impl GpioBackend for MockGpio {
    fn claim_output(&mut self, pin: u32, initial: bool) -> Result<Box<dyn OutputLine>> {
        self.levels.lock().unwrap().insert(pin, initial);
        Ok(Box::new(MockOutput {
            pin,
            levels: Arc::clone(&self.levels),
        }))
    }

    fn watch_edge(
        &mut self,
        pin: u32,
        _edge: Edge,
        _bias: Bias,
        _debounce: Duration,
        _label: &str,
        callback: EdgeCallback,
    ) -> Result<()> {
        self.watchers.lock().unwrap().push(Watcher { pin, callback });
        Ok(())
    }
}

struct MockOutput {
    pin: u32,
    levels: PinLevels,
}

impl OutputLine for MockOutput {
    fn write(&mut self, value: bool) -> Result<()> {
        self.levels.lock().unwrap().insert(self.pin, value);
        Ok(())
    }

    fn read(&self) -> Result<bool> {
        Ok(self
            .levels
            .lock()
            .unwrap()
            .get(&self.pin)
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn claimed_output_tracks_writes() {
        let mut gpio = MockGpio::new();
        let mut line = gpio.claim_output(20, false).unwrap();
        assert_eq!(gpio.output_level(20), Some(false));

        line.write(true).unwrap();
        assert_eq!(gpio.output_level(20), Some(true));
        assert!(line.read().unwrap());
    }

    #[test]
    fn trigger_fires_only_matching_watchers() {
        let mut gpio = MockGpio::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&hits);
        gpio.watch_edge(
            18,
            Edge::Falling,
            Bias::PullUp,
            Duration::from_millis(80),
            "start",
            Box::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        gpio.trigger(19);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        gpio.trigger(18);
        gpio.trigger(18);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(gpio.watcher_count(), 1);
    }
}
