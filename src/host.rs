//! Host power control.
//!
//! The one-way action at the end of the power-loss path: halting the host
//! so it is down before the UPS capacitors drain. Callers must invoke this
//! outside any shared lock; the command can block for seconds and nothing
//! may deadlock behind it.

use anyhow::{bail, Result};
use std::process::Command;

use crate::constants::HALT_TIMEOUT;
use crate::utils::run_with_timeout;

/// Host-level power actions.
pub trait HostPower: Send + Sync {
    /// Order an immediate orderly halt.
    fn halt(&self) -> Result<()>;
}

/// Halts via `shutdown -h now`.
pub struct SystemHalt {
    dry_run: bool,
}

impl SystemHalt {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl HostPower for SystemHalt {
    fn halt(&self) -> Result<()> {
        if self.dry_run {
            log_decorated!("[dry-run] would execute: shutdown -h now");
            return Ok(());
        }

        let out = run_with_timeout(Command::new("shutdown").args(["-h", "now"]), HALT_TIMEOUT)?;
        if !out.success() {
            bail!("shutdown -h now failed: {}", out.stderr.trim());
        }
        Ok(())
    }
}
