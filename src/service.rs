//! Render-service adapter.
//!
//! The matrix renderer runs as a systemd unit; the supervisor only ever
//! starts it, stops it, and asks whether it is active. All three operations
//! carry a bounded timeout so a wedged `systemctl` can never stall the
//! controller's critical section, and a dry-run mode that short-circuits
//! without touching the OS.

use anyhow::{bail, Result};
use std::process::Command;

use crate::constants::{SERVICE_START_TIMEOUT, SERVICE_STATUS_TIMEOUT, SERVICE_STOP_TIMEOUT};
use crate::utils::run_with_timeout;

/// Operations against the rendering service. Implementations must be
/// idempotent: stopping a stopped service succeeds.
pub trait RenderService: Send {
    /// Start the service.
    fn start(&mut self) -> Result<()>;
    /// Stop the service. Succeeds if the unit is already stopped or not
    /// loaded at all.
    fn stop(&mut self) -> Result<()>;
    /// Whether the unit is currently active.
    fn is_active(&mut self) -> Result<bool>;
    /// Unit name for log messages.
    fn unit_name(&self) -> &str;
}

/// `systemctl`-backed implementation.
pub struct SystemdUnit {
    unit: String,
    dry_run: bool,
}

impl SystemdUnit {
    pub fn new(unit: impl Into<String>, dry_run: bool) -> Self {
        Self {
            unit: unit.into(),
            dry_run,
        }
    }
}

impl RenderService for SystemdUnit {
    fn start(&mut self) -> Result<()> {
        if self.dry_run {
            log_decorated!("[dry-run] would start {}", self.unit);
            return Ok(());
        }

        let out = run_with_timeout(
            Command::new("systemctl").arg("start").arg(&self.unit),
            SERVICE_START_TIMEOUT,
        )?;
        if !out.success() {
            bail!("systemctl start {} failed: {}", self.unit, out.stderr.trim());
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.dry_run {
            log_decorated!("[dry-run] would stop {}", self.unit);
            return Ok(());
        }

        let out = run_with_timeout(
            Command::new("systemctl").arg("stop").arg(&self.unit),
            SERVICE_STOP_TIMEOUT,
        )?;
        if !out.success() {
            // A unit that is not loaded is already stopped.
            let stderr = out.stderr.to_lowercase();
            if stderr.contains("not loaded") || stderr.contains("not found") {
                log_warning!("Service {} not found or not loaded", self.unit);
                return Ok(());
            }
            bail!("systemctl stop {} failed: {}", self.unit, out.stderr.trim());
        }
        Ok(())
    }

    fn is_active(&mut self) -> Result<bool> {
        if self.dry_run {
            return Ok(false);
        }

        // is-active exits non-zero for inactive units; only the output
        // distinguishes "inactive" from an actual invocation failure.
        let out = run_with_timeout(
            Command::new("systemctl").arg("is-active").arg(&self.unit),
            SERVICE_STATUS_TIMEOUT,
        )?;
        Ok(out.success() && out.stdout.trim() == "active")
    }

    fn unit_name(&self) -> &str {
        &self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_short_circuits_every_operation() {
        crate::logger::Log::set_enabled(false);
        let mut service = SystemdUnit::new("matrix-led.service", true);
        assert!(service.start().is_ok());
        assert!(service.stop().is_ok());
        assert!(!service.is_active().unwrap());
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    fn reports_unit_name() {
        let service = SystemdUnit::new("wall.service", true);
        assert_eq!(service.unit_name(), "wall.service");
    }
}
