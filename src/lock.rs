//! Lock file management for single-instance enforcement.
//!
//! Two supervisors driving one relay would fight each other through the
//! watchdog, so only one matrixd may run at a time. The lock lives in the
//! runtime directory and holds the owner's PID; a lock whose owner is gone
//! is treated as stale and reclaimed.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

/// Path of the lock file in the runtime directory.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("matrixd.lock")
}

/// Acquire the single-instance lock.
///
/// # Returns
/// - `Ok(Some(lock_file))` if the lock was acquired (hold the file for the
///   process lifetime; the kernel releases the lock on exit)
/// - `Ok(None)` if another live instance holds it
/// - `Err(_)` on I/O failure
pub fn acquire_lock() -> Result<Option<File>> {
    let path = lock_path();

    // Open without truncating so a live owner's PID is preserved while we
    // probe the lock.
    let open = || {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))
    };

    let mut lock_file = open()?;
    if try_exclusive(&mut lock_file)? {
        return Ok(Some(lock_file));
    }

    // Lock is held; decide whether the owner is still alive.
    match read_owner_pid(&path) {
        Some(pid) if process_exists(pid) => {
            log_error!("Another matrixd instance is already running (PID {})", pid);
            Ok(None)
        }
        _ => {
            // Stale or unreadable lock: flock should have been released by
            // the kernel when the owner died, so retry once.
            let mut retry = open()?;
            if try_exclusive(&mut retry)? {
                log_warning!("Reclaimed stale lock file {}", path.display());
                Ok(Some(retry))
            } else {
                log_error!("Another matrixd instance holds {}", path.display());
                Ok(None)
            }
        }
    }
}

fn try_exclusive(lock_file: &mut File) -> Result<bool> {
    match lock_file.try_lock_exclusive() {
        Ok(()) => {
            lock_file.set_len(0)?;
            lock_file.seek(SeekFrom::Start(0))?;
            writeln!(lock_file, "{}", std::process::id())?;
            lock_file.flush()?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

fn read_owner_pid(path: &PathBuf) -> Option<i32> {
    let content = std::fs::read_to_string(path).ok()?;
    content.lines().next()?.trim().parse().ok()
}

/// Probe whether a PID refers to a live process (kill with signal 0).
fn process_exists(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}
