//! End-to-end scenarios for the event reconciler: button handling with
//! rollback, power loss, watchdog corrections, and the serialization of
//! near-simultaneous events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use anyhow::anyhow;
use matrixd::controller::Controller;
use matrixd::gpio::{OutputLine, Relay};
use matrixd::host::HostPower;
use matrixd::logger::Log;
use matrixd::service::RenderService;
use matrixd::state_machine::LogicalState;

mockall::mock! {
    Service {}
    impl RenderService for Service {
        fn start(&mut self) -> anyhow::Result<()>;
        fn stop(&mut self) -> anyhow::Result<()>;
        fn is_active(&mut self) -> anyhow::Result<bool>;
        fn unit_name(&self) -> &str;
    }
}

mockall::mock! {
    Halt {}
    impl HostPower for Halt {
        fn halt(&self) -> anyhow::Result<()>;
    }
}

/// Output line whose level tests can observe from outside the controller.
struct FakeLine {
    level: Arc<Mutex<bool>>,
}

impl OutputLine for FakeLine {
    fn write(&mut self, value: bool) -> anyhow::Result<()> {
        *self.level.lock().unwrap() = value;
        Ok(())
    }

    fn read(&self) -> anyhow::Result<bool> {
        Ok(*self.level.lock().unwrap())
    }
}

/// An active-high relay on a fake line, plus the observable level handle.
fn fake_relay() -> (Relay, Arc<Mutex<bool>>) {
    let level = Arc::new(Mutex::new(false));
    let line = FakeLine {
        level: Arc::clone(&level),
    };
    (Relay::from_line(Box::new(line), true), level)
}

fn relay_is_on(level: &Arc<Mutex<bool>>) -> bool {
    *level.lock().unwrap()
}

fn halt_never() -> MockHalt {
    let mut halt = MockHalt::new();
    halt.expect_halt().times(0);
    halt
}

#[test]
fn scenario_start_success_brings_system_up() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();

    assert_eq!(controller.current_state(), LogicalState::Running);
    assert!(relay_is_on(&level));
}

#[test]
fn scenario_start_failure_rolls_back_to_idle() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service
        .expect_start()
        .times(1)
        .returning(|| Err(anyhow!("unit failed to start")));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();

    // Partial failure must not leave mains on a dark matrix.
    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));
}

#[test]
fn start_is_ignored_unless_idle() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    // Exactly one start: the second button press must not reach the service.
    service.expect_start().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.on_start_pressed();

    assert_eq!(controller.current_state(), LogicalState::Running);
    assert!(relay_is_on(&level));
}

#[test]
fn scenario_stop_brings_system_down_once() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service.expect_stop().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.on_stop_pressed();

    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));

    // A second stop while already idle is a defined no-op; the times(1)
    // expectation above would fail if the service saw another stop.
    controller.on_stop_pressed();
    assert_eq!(controller.current_state(), LogicalState::Idle);
}

#[test]
fn stop_while_idle_is_a_no_op() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_stop().times(0);

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_stop_pressed();

    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));
}

#[test]
fn scenario_power_loss_halts_host_exactly_once() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service.expect_stop().times(1).returning(|| Ok(()));
    let mut halt = MockHalt::new();
    halt.expect_halt().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt));
    controller.on_start_pressed();
    controller.on_power_lost();

    assert_eq!(controller.current_state(), LogicalState::EmergencyShutdown);
    assert!(!relay_is_on(&level));

    // Repeated power loss and button presses after the terminal transition
    // change nothing and trigger no further actuator or halt calls.
    controller.on_power_lost();
    controller.on_start_pressed();
    controller.on_stop_pressed();
    assert_eq!(controller.current_state(), LogicalState::EmergencyShutdown);
    assert!(!relay_is_on(&level));
}

#[test]
fn power_loss_works_from_idle() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_stop().times(1).returning(|| Ok(()));
    let mut halt = MockHalt::new();
    halt.expect_halt().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt));
    controller.on_power_lost();

    assert_eq!(controller.current_state(), LogicalState::EmergencyShutdown);
    assert!(!relay_is_on(&level));
}

#[test]
fn power_loss_secures_hardware_even_if_actuators_fail() {
    Log::set_enabled(false);
    let (relay, _level) = fake_relay();
    let mut service = MockService::new();
    service
        .expect_stop()
        .times(1)
        .returning(|| Err(anyhow!("stop timed out")));
    let mut halt = MockHalt::new();
    halt.expect_halt().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt));
    controller.on_power_lost();

    // Actuator failure is logged, not retried: the halt still happens.
    assert_eq!(controller.current_state(), LogicalState::EmergencyShutdown);
}

#[test]
fn scenario_watchdog_demotes_running_with_dead_service() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service.expect_is_active().times(1).returning(|| Ok(false));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.on_watchdog_tick();

    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));
}

#[test]
fn watchdog_leaves_healthy_running_system_alone() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service.expect_is_active().times(1).returning(|| Ok(true));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.on_watchdog_tick();

    assert_eq!(controller.current_state(), LogicalState::Running);
    assert!(relay_is_on(&level));
}

#[test]
fn watchdog_stops_stray_service_while_idle() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_is_active().times(1).returning(|| Ok(true));
    service.expect_stop().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_watchdog_tick();

    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));
}

#[test]
fn watchdog_makes_no_corrections_on_unknown_readings() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service
        .expect_is_active()
        .times(1)
        .returning(|| Err(anyhow!("status query timed out")));
    service.expect_stop().times(0);

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.on_watchdog_tick();

    // An unreadable service state must not demote a running system.
    assert_eq!(controller.current_state(), LogicalState::Running);
    assert!(relay_is_on(&level));
}

#[test]
fn startup_sequence_forces_safe_baseline() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_stop().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.startup();

    assert_eq!(controller.current_state(), LogicalState::Idle);
    assert!(!relay_is_on(&level));
}

#[test]
fn shutdown_sequence_stops_service_and_relay_without_touching_state() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    service.expect_start().times(1).returning(|| Ok(()));
    service.expect_stop().times(1).returning(|| Ok(()));

    let controller = Controller::new(relay, Box::new(service), Box::new(halt_never()));
    controller.on_start_pressed();
    controller.shutdown();

    // The process is exiting; the logical state stays as it was.
    assert_eq!(controller.current_state(), LogicalState::Running);
    assert!(!relay_is_on(&level));
}

#[test]
fn racing_start_and_stop_serialize_to_a_consistent_state() {
    Log::set_enabled(false);
    let (relay, level) = fake_relay();
    let mut service = MockService::new();
    // Whichever order the lock imposes, the service sees at most one start
    // and at most one stop, never interleaved.
    let started = Arc::new(AtomicBool::new(false));
    let started_in_start = Arc::clone(&started);
    service
        .expect_start()
        .times(1)
        .returning(move || {
            started_in_start.store(true, Ordering::SeqCst);
            Ok(())
        });
    let started_in_stop = Arc::clone(&started);
    service
        .expect_stop()
        .times(0..=1)
        .returning(move || {
            assert!(
                started_in_stop.load(Ordering::SeqCst),
                "stop reached the service before start"
            );
            Ok(())
        });

    let controller = Arc::new(Controller::new(
        relay,
        Box::new(service),
        Box::new(halt_never()),
    ));
    let barrier = Arc::new(Barrier::new(2));

    let starter = {
        let controller = Arc::clone(&controller);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            controller.on_start_pressed();
        })
    };
    let stopper = {
        let controller = Arc::clone(&controller);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            controller.on_stop_pressed();
        })
    };
    starter.join().unwrap();
    stopper.join().unwrap();

    // Exactly one of the two orderings happened; both end consistent with
    // the transition table.
    match controller.current_state() {
        LogicalState::Running => assert!(relay_is_on(&level)),
        LogicalState::Idle => assert!(!relay_is_on(&level)),
        other => panic!("unexpected final state {other}"),
    }
}
