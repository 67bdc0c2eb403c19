//! GPIO backend over the Linux character device.
//!
//! One chip handle is opened for the whole process and shared by every
//! claimed line. Each edge-watched input gets its own monitor thread that
//! blocks on kernel edge events and applies the debounce window in
//! software: after an accepted edge, further events on the line are
//! discarded until the window elapses.

use anyhow::{Context, Result};
use std::thread;
use std::time::{Duration, Instant};

use super::{Bias, Edge, EdgeCallback, GpioBackend, OutputLine};

/// Character-device backend. Construct once and pass by reference wherever
/// lines are claimed.
pub struct CdevGpio {
    chip: gpiod::Chip,
}

impl CdevGpio {
    /// Open a GPIO chip by name (e.g. `gpiochip4`).
    pub fn open(chip_name: &str) -> Result<Self> {
        let chip = gpiod::Chip::new(chip_name)
            .with_context(|| format!("failed to open GPIO chip {chip_name}"))?;
        Ok(Self { chip })
    }
}

impl GpioBackend for CdevGpio {
    fn claim_output(&mut self, pin: u32, initial: bool) -> Result<Box<dyn OutputLine>> {
        let opts = gpiod::Options::output([pin])
            .values([initial])
            .consumer("matrixd");
        let lines = self
            .chip
            .request_lines(opts)
            .with_context(|| format!("failed to claim GPIO{pin} as output"))?;
        Ok(Box::new(CdevOutput { lines }))
    }

    fn watch_edge(
        &mut self,
        pin: u32,
        edge: Edge,
        bias: Bias,
        debounce: Duration,
        label: &str,
        callback: EdgeCallback,
    ) -> Result<()> {
        let detect = match edge {
            Edge::Rising => gpiod::EdgeDetect::Rising,
            Edge::Falling => gpiod::EdgeDetect::Falling,
        };
        let mut opts = gpiod::Options::input([pin])
            .edge(detect)
            .consumer("matrixd");
        opts = match bias {
            Bias::Disabled => opts,
            Bias::PullUp => opts.bias(gpiod::Bias::PullUp),
            Bias::PullDown => opts.bias(gpiod::Bias::PullDown),
        };

        let mut lines = self
            .chip
            .request_lines(opts)
            .with_context(|| format!("failed to claim GPIO{pin} for edge monitoring"))?;

        let thread_label = label.to_string();
        thread::Builder::new()
            .name(format!("edge-{label}"))
            .spawn(move || {
                let mut last_accepted: Option<Instant> = None;
                loop {
                    match lines.read_event() {
                        Ok(_event) => {
                            let now = Instant::now();
                            let settled = last_accepted
                                .map_or(true, |t| now.duration_since(t) >= debounce);
                            if settled {
                                last_accepted = Some(now);
                                callback();
                            }
                        }
                        Err(e) => {
                            log_error!(
                                "Edge monitor '{}' failed to read GPIO{} event: {}",
                                thread_label,
                                pin,
                                e
                            );
                            thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            })
            .with_context(|| format!("failed to spawn edge monitor for GPIO{pin}"))?;

        Ok(())
    }
}

struct CdevOutput {
    lines: gpiod::Lines<gpiod::Output>,
}

impl OutputLine for CdevOutput {
    fn write(&mut self, value: bool) -> Result<()> {
        self.lines
            .set_values([value])
            .context("failed to write output line")?;
        Ok(())
    }

    fn read(&self) -> Result<bool> {
        let values = self
            .lines
            .get_values([false; 1])
            .context("failed to read output line")?;
        Ok(values[0])
    }
}
