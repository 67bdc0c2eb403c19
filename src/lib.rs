//! # Matrixd Library
//!
//! Internal library for the matrixd binary application
//!
//! This library exists to enable testing of the supervisor internals and to
//! provide clean separation between CLI dispatch (main.rs) and daemon logic.
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Entry Point**: `Matrixd` struct provides the daemon API with resource management
//! - **Core Logic**: `controller` owns the lock-guarded reconciliation of button,
//!   power-loss, and watchdog events against the `state_machine`
//! - **Watchdog**: `watchdog` plans corrective actions from observed actuator state
//! - **Adapters**: `gpio` (buttons, relay), `service` (render service unit),
//!   `ups` (power-loss input), `host` (system halt)
//! - **Configuration**: `config` module for TOML-based settings
//! - **Infrastructure**: signal handling, single-instance locking, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod config;
pub mod constants;
pub mod controller;
pub mod gpio;
pub mod host;
pub mod lock;
pub mod service;
pub mod signals;
pub mod state_machine;
pub mod ups;
pub mod utils;
pub mod watchdog;

// Internal modules
mod matrixd;

// Re-export for binary
pub use matrixd::Matrixd;
