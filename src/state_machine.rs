//! Logical run state of the installation and its legal transitions.
//!
//! The state machine is deliberately free of I/O and locking: it is mutated
//! only inside the controller's critical section, which combines transitions
//! atomically with the actuator commands they imply. Every transition logs
//! old and new state.

use std::fmt;

/// Logical state of the installation. Exactly one value is current at any
/// instant; the process always starts in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalState {
    /// Relay off, render service stopped.
    Idle,
    /// Relay on, render service active.
    Running,
    /// Terminal: the host is about to halt. No transition leads out of it.
    EmergencyShutdown,
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalState::Idle => "IDLE",
            LogicalState::Running => "RUNNING",
            LogicalState::EmergencyShutdown => "EMERGENCY_SHUTDOWN",
        };
        f.write_str(name)
    }
}

/// Holds the current [`LogicalState`] and enforces the transition table.
#[derive(Debug)]
pub struct StateMachine {
    state: LogicalState,
}

impl StateMachine {
    /// Create a state machine in `Idle`.
    pub fn new() -> Self {
        Self {
            state: LogicalState::Idle,
        }
    }

    /// Transition to `Idle`.
    ///
    /// Succeeds from `Idle` (idempotent) and `Running`; fails from the
    /// terminal `EmergencyShutdown` state, leaving the state unchanged.
    pub fn transition_to_idle(&mut self) -> bool {
        if self.state == LogicalState::EmergencyShutdown {
            log_warning!("Cannot transition from EMERGENCY_SHUTDOWN to IDLE");
            return false;
        }
        let old = self.state;
        self.state = LogicalState::Idle;
        log_decorated!("State transition: {} -> {}", old, self.state);
        true
    }

    /// Transition to `Running`. Succeeds only from exactly `Idle`.
    pub fn transition_to_running(&mut self) -> bool {
        if self.state != LogicalState::Idle {
            log_warning!("Cannot transition to RUNNING from {}", self.state);
            return false;
        }
        let old = self.state;
        self.state = LogicalState::Running;
        log_decorated!("State transition: {} -> {}", old, self.state);
        true
    }

    /// Transition to `EmergencyShutdown`. Always succeeds, from any state,
    /// and is irreversible for the remainder of the process.
    pub fn transition_to_emergency_shutdown(&mut self) -> bool {
        let old = self.state;
        self.state = LogicalState::EmergencyShutdown;
        log_warning!("State transition: {} -> {}", old, self.state);
        true
    }

    pub fn current_state(&self) -> LogicalState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == LogicalState::Idle
    }

    pub fn is_running(&self) -> bool {
        self.state == LogicalState::Running
    }

    pub fn is_emergency_shutdown(&self) -> bool {
        self.state == LogicalState::EmergencyShutdown
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
