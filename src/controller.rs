//! Event reconciliation between buttons, UPS, watchdog, and actuators.
//!
//! The controller owns the single critical section of the daemon: one mutex
//! guarding the state machine together with the relay and the render
//! service. Button presses, power-loss events, and the periodic sweep all
//! serialize through it, so a state transition is always combined
//! atomically with the actuator commands it implies and two handlers can
//! never interleave their relay/service commands.
//!
//! Handlers re-check preconditions after taking the lock rather than
//! trusting whatever state the hardware edge was observed under. Actuator
//! failures never escape a handler: they are logged, the state is rolled
//! toward safe where needed, and the next sweep re-validates the rest.
//!
//! The one action taken outside the lock is the host halt at the end of the
//! power-loss path: it can block for seconds and nothing may deadlock
//! behind it.

use std::sync::{Mutex, MutexGuard};

use crate::gpio::Relay;
use crate::host::HostPower;
use crate::service::RenderService;
use crate::state_machine::{LogicalState, StateMachine};
use crate::watchdog::{self, ActuatorView, Correction};

/// Everything the critical section protects.
pub struct Actuators {
    pub state: StateMachine,
    pub relay: Relay,
    pub service: Box<dyn RenderService>,
}

/// The event reconciler.
pub struct Controller {
    inner: Mutex<Actuators>,
    halt: Box<dyn HostPower>,
}

impl Controller {
    pub fn new(relay: Relay, service: Box<dyn RenderService>, halt: Box<dyn HostPower>) -> Self {
        Self {
            inner: Mutex::new(Actuators {
                state: StateMachine::new(),
                relay,
                service,
            }),
            halt,
        }
    }

    /// Enter the critical section.
    ///
    /// A poisoned mutex is recovered rather than propagated: the supervisor
    /// must keep failing toward safe even after a panicked handler, and the
    /// guarded data is exactly what the sweep re-validates.
    fn actuators(&self) -> MutexGuard<'_, Actuators> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current logical state, for logging and telemetry only.
    pub fn current_state(&self) -> LogicalState {
        self.actuators().state.current_state()
    }

    /// Startup sequence: force a known-safe baseline regardless of whatever
    /// a previous process crash left behind.
    pub fn startup(&self) {
        log_block_start!("Establishing safe baseline...");
        let mut a = self.actuators();

        if let Err(e) = a.relay.set(false) {
            log_error!("Failed to force relay off during startup: {:#}", e);
        }

        if let Err(e) = a.service.stop() {
            log_error!("Failed to stop {} during startup: {:#}", a.service.unit_name(), e);
        } else {
            log_decorated!("Render service stopped (if it was running)");
        }

        if !a.state.is_idle() {
            a.state.transition_to_idle();
        }
        log_decorated!("Baseline established: controller in IDLE state");
    }

    /// Shutdown sequence on graceful termination. Leaves the logical state
    /// untouched; the process is exiting.
    pub fn shutdown(&self) {
        log_block_start!("Shutting down matrixd...");
        let mut a = self.actuators();

        if let Err(e) = a.service.stop() {
            log_error!("Failed to stop {}: {:#}", a.service.unit_name(), e);
        }
        if let Err(e) = a.relay.set(false) {
            log_error!("Failed to switch relay off: {:#}", e);
        }
    }

    /// Start button: bring the installation up, rolling back to a
    /// known-safe idle if the bring-up only half succeeds.
    pub fn on_start_pressed(&self) {
        log_block_start!("Start button pressed");
        let mut a = self.actuators();

        if !a.state.is_idle() {
            log_warning!(
                "Start button ignored - not in IDLE state (current: {})",
                a.state.current_state()
            );
            return;
        }

        if !a.state.transition_to_running() {
            log_error!("Failed to transition to RUNNING state");
            return;
        }

        if let Err(e) = a.relay.set(true) {
            log_error!("Failed to switch relay on: {:#}", e);
            Self::roll_back_to_idle(&mut a);
            return;
        }

        match a.service.start() {
            Ok(()) => {
                log_decorated!("System started: relay ON, render service running");
            }
            Err(e) => {
                // Partial failure: mains is on but nothing renders. Fail
                // toward safe instead of staying "running" with a dark matrix.
                log_error!("Failed to start render service: {:#}", e);
                Self::roll_back_to_idle(&mut a);
            }
        }
    }

    fn roll_back_to_idle(a: &mut Actuators) {
        log_decorated!("Reverting to IDLE");
        if let Err(e) = a.relay.set(false) {
            log_error!("Rollback could not switch relay off: {:#}", e);
        }
        a.state.transition_to_idle();
    }

    /// Stop button: stop rendering before cutting power so the service is
    /// never killed mid-frame by the PSU dropping out.
    pub fn on_stop_pressed(&self) {
        log_block_start!("Stop button pressed");
        let mut a = self.actuators();

        if !a.state.is_running() {
            log_warning!(
                "Stop button ignored - not in RUNNING state (current: {})",
                a.state.current_state()
            );
            return;
        }

        if let Err(e) = a.service.stop() {
            log_error!("Failed to stop render service: {:#}", e);
        }
        if let Err(e) = a.relay.set(false) {
            log_error!("Failed to switch relay off: {:#}", e);
        }
        a.state.transition_to_idle();

        log_decorated!("System stopped: relay OFF, render service stopped");
    }

    /// Power loss: unconditional from any state. Secure the hardware under
    /// the lock, then halt the host after releasing it.
    pub fn on_power_lost(&self) {
        log_pipe!();
        log_critical!("UPS reports mains power lost!");

        {
            let mut a = self.actuators();

            if a.state.is_emergency_shutdown() {
                log_warning!("Already in EMERGENCY_SHUTDOWN - ignoring repeated power-loss event");
                return;
            }

            a.state.transition_to_emergency_shutdown();

            // Best effort only: imminent power loss makes retries moot.
            if let Err(e) = a.service.stop() {
                log_error!("Failed to stop render service: {:#}", e);
            }
            if let Err(e) = a.relay.set(false) {
                log_error!("Failed to switch relay off: {:#}", e);
            }
        }

        log_critical!("Executing system shutdown for safe halt...");
        if let Err(e) = self.halt.halt() {
            log_error!("Failed to execute shutdown: {:#}", e);
        }
    }

    /// Watchdog tick: read the actuators, plan corrections against the
    /// current state, and apply them - all inside the lock.
    pub fn on_watchdog_tick(&self) {
        let mut a = self.actuators();
        let state = a.state.current_state();

        let relay_on = match a.relay.is_on() {
            Ok(on) => Some(on),
            Err(e) => {
                log_error!("Watchdog could not read relay state: {:#}", e);
                None
            }
        };
        let service_active = match a.service.is_active() {
            Ok(active) => Some(active),
            Err(e) => {
                log_error!("Watchdog could not query render service: {:#}", e);
                None
            }
        };

        let view = ActuatorView::new(relay_on, service_active);
        for correction in watchdog::plan(state, &view) {
            match correction {
                Correction::StopService => {
                    log_warning!("State is {} but render service is active - stopping service", state);
                    if let Err(e) = a.service.stop() {
                        log_error!("Watchdog failed to stop render service: {:#}", e);
                    }
                }
                Correction::SwitchRelayOff => {
                    log_warning!("State is {} but relay/service diverged - switching relay off", state);
                    if let Err(e) = a.relay.set(false) {
                        log_error!("Watchdog failed to switch relay off: {:#}", e);
                    }
                }
                Correction::DemoteToIdle => {
                    log_warning!("Render service died unexpectedly - treating as stop");
                    a.state.transition_to_idle();
                }
            }
        }

        log_debug!(
            "Watchdog tick: state={}, relay={}, service_active={}",
            a.state.current_state(),
            match relay_on {
                Some(true) => "ON",
                Some(false) => "OFF",
                None => "unknown",
            },
            match service_active {
                Some(active) => active.to_string(),
                None => "unknown".to_string(),
            }
        );
    }
}
