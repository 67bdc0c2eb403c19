//! Consistency sweep planning.
//!
//! The watchdog compares the observed actuator state against what the
//! current [`LogicalState`] requires and plans corrective actions. Planning
//! is a pure function so the full divergence table is unit-testable without
//! hardware; the controller applies the plan inside its critical section.
//!
//! The sweep is a monotone corrector: it only ever moves the system toward
//! the safer state and never transitions into `Running`.

use crate::state_machine::LogicalState;

/// Snapshot of the physical actuators, read live from the adapters.
///
/// A leg is `None` when the adapter read failed; an unknown reading never
/// produces a correction and is retried on the next sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorView {
    pub relay_on: Option<bool>,
    pub service_active: Option<bool>,
}

impl ActuatorView {
    pub fn new(relay_on: Option<bool>, service_active: Option<bool>) -> Self {
        Self {
            relay_on,
            service_active,
        }
    }
}

/// Corrective action the sweep wants applied, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Stop the render service.
    StopService,
    /// Force the relay off.
    SwitchRelayOff,
    /// Treat an unexpected service death as a stop request.
    DemoteToIdle,
}

/// Plan the corrections for one sweep.
///
/// Divergence policy:
/// - `Running` but service inactive: relay off, demote to `Idle`.
/// - `Idle` but service active: stop the service.
/// - `Idle` but relay on: switch the relay off.
/// - `EmergencyShutdown`: nothing; the process is halting.
pub fn plan(state: LogicalState, view: &ActuatorView) -> Vec<Correction> {
    let mut corrections = Vec::new();

    match state {
        LogicalState::Running => {
            if view.service_active == Some(false) {
                corrections.push(Correction::SwitchRelayOff);
                corrections.push(Correction::DemoteToIdle);
            }
        }
        LogicalState::Idle => {
            if view.service_active == Some(true) {
                corrections.push(Correction::StopService);
            }
            if view.relay_on == Some(true) {
                corrections.push(Correction::SwitchRelayOff);
            }
        }
        LogicalState::EmergencyShutdown => {}
    }

    corrections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(relay_on: bool, service_active: bool) -> ActuatorView {
        ActuatorView::new(Some(relay_on), Some(service_active))
    }

    #[test]
    fn consistent_states_need_no_correction() {
        assert!(plan(LogicalState::Idle, &view(false, false)).is_empty());
        assert!(plan(LogicalState::Running, &view(true, true)).is_empty());
        assert!(plan(LogicalState::EmergencyShutdown, &view(false, false)).is_empty());
    }

    #[test]
    fn running_with_dead_service_demotes_to_idle() {
        let corrections = plan(LogicalState::Running, &view(true, false));
        assert_eq!(
            corrections,
            vec![Correction::SwitchRelayOff, Correction::DemoteToIdle]
        );
    }

    #[test]
    fn idle_with_active_service_stops_it() {
        let corrections = plan(LogicalState::Idle, &view(false, true));
        assert_eq!(corrections, vec![Correction::StopService]);
    }

    #[test]
    fn idle_with_relay_on_switches_it_off() {
        let corrections = plan(LogicalState::Idle, &view(true, false));
        assert_eq!(corrections, vec![Correction::SwitchRelayOff]);
    }

    #[test]
    fn idle_with_both_divergences_corrects_both() {
        let corrections = plan(LogicalState::Idle, &view(true, true));
        assert_eq!(
            corrections,
            vec![Correction::StopService, Correction::SwitchRelayOff]
        );
    }

    #[test]
    fn unknown_readings_are_never_corrected() {
        let unknown = ActuatorView::new(None, None);
        assert!(plan(LogicalState::Idle, &unknown).is_empty());
        assert!(plan(LogicalState::Running, &unknown).is_empty());

        // One known leg is still corrected while the other stays untouched.
        let partial = ActuatorView::new(Some(true), None);
        assert_eq!(
            plan(LogicalState::Idle, &partial),
            vec![Correction::SwitchRelayOff]
        );
        assert!(plan(LogicalState::Running, &partial).is_empty());
    }

    #[test]
    fn emergency_shutdown_is_left_alone() {
        assert!(plan(LogicalState::EmergencyShutdown, &view(true, true)).is_empty());
    }

    #[test]
    fn sweep_never_promotes_to_running() {
        // Service alive while Idle is corrected by stopping the service,
        // not by adopting it.
        let corrections = plan(LogicalState::Idle, &view(true, true));
        assert_eq!(
            corrections,
            vec![Correction::StopService, Correction::SwitchRelayOff]
        );
    }
}
