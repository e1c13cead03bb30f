//! Control-loop state machine - NO I/O, just state transitions.
//!
//! The monitor feeds events (timer ticks, poll results, batch completion)
//! into the machine and executes the actions it returns. Keeping the
//! transitions pure means the whole disruption cadence is testable
//! without a timer or a Docker daemon.

use crate::fleet::ContainerId;
use crate::health::HealthTracker;

/// Control-loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// A health poll is in flight.
    Polling,
    /// A disruption cycle (leader resolution, selection, restarts) is in
    /// flight.
    Disrupting,
    /// Terminal; entered on cancellation.
    Stopped,
}

/// Events fed to the machine by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The fixed-interval timer fired.
    Tick,
    /// A health poll finished.
    HealthObserved {
        /// Members observed as not running.
        unhealthy: Vec<ContainerId>,
    },
    /// Every restart attempt of the current batch has resolved,
    /// regardless of individual outcomes.
    BatchResolved,
    /// Cancellation was requested.
    ShutdownRequested,
}

/// Actions the monitor must execute after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Query the running state of every fleet member.
    PollFleet,
    /// Resolve the leader, select targets and restart them.
    BeginDisruption,
}

/// The control machine: current state plus the sticky all-healthy flag.
///
/// The flag is owned here exclusively; it is armed by a fully-healthy
/// poll observation and consumed by the tick that begins a disruption.
/// No other component may mutate it.
#[derive(Debug, Default)]
pub struct ControlMachine {
    state: ControlState,
    health: HealthTracker,
}

impl ControlMachine {
    /// Create a machine in `Idle` with the flag unarmed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Whether the next tick will begin a disruption cycle.
    pub fn is_armed(&self) -> bool {
        self.health.is_armed()
    }

    /// Process an event and return the actions to execute.
    pub fn on_event(&mut self, event: Event) -> Vec<Action> {
        match (self.state, event) {
            // An armed tick disrupts without re-polling: the flag's truth
            // certifies the previous tick's full-health observation.
            (ControlState::Idle, Event::Tick) => {
                if self.health.take_armed() {
                    self.state = ControlState::Disrupting;
                    vec![Action::BeginDisruption]
                } else {
                    self.state = ControlState::Polling;
                    vec![Action::PollFleet]
                }
            }

            (ControlState::Polling, Event::HealthObserved { unhealthy }) => {
                self.health.observe(&unhealthy);
                self.state = ControlState::Idle;
                vec![]
            }

            (ControlState::Disrupting, Event::BatchResolved) => {
                self.state = ControlState::Idle;
                vec![]
            }

            (ControlState::Stopped, _) => vec![],

            (_, Event::ShutdownRequested) => {
                self.state = ControlState::Stopped;
                vec![]
            }

            // Invalid transitions - stay in current state
            (_, _) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhealthy(names: &[&str]) -> Vec<ContainerId> {
        names.iter().map(|n| ContainerId::from(*n)).collect()
    }

    #[test]
    fn starts_idle_and_unarmed() {
        let machine = ControlMachine::new();
        assert_eq!(machine.state(), ControlState::Idle);
        assert!(!machine.is_armed());
    }

    #[test]
    fn tick_polls_when_unarmed() {
        let mut machine = ControlMachine::new();
        let actions = machine.on_event(Event::Tick);
        assert_eq!(actions, vec![Action::PollFleet]);
        assert_eq!(machine.state(), ControlState::Polling);
    }

    #[test]
    fn healthy_poll_arms_next_tick() {
        let mut machine = ControlMachine::new();

        machine.on_event(Event::Tick);
        machine.on_event(Event::HealthObserved { unhealthy: vec![] });
        assert_eq!(machine.state(), ControlState::Idle);
        assert!(machine.is_armed());

        let actions = machine.on_event(Event::Tick);
        assert_eq!(actions, vec![Action::BeginDisruption]);
        assert_eq!(machine.state(), ControlState::Disrupting);
        assert!(!machine.is_armed());
    }

    #[test]
    fn unhealthy_poll_keeps_polling_cadence() {
        let mut machine = ControlMachine::new();

        for _ in 0..3 {
            let actions = machine.on_event(Event::Tick);
            assert_eq!(actions, vec![Action::PollFleet]);
            machine.on_event(Event::HealthObserved {
                unhealthy: unhealthy(&["etcd-2"]),
            });
            assert_eq!(machine.state(), ControlState::Idle);
            assert!(!machine.is_armed());
        }
    }

    #[test]
    fn batch_resolution_returns_to_idle() {
        let mut machine = ControlMachine::new();

        machine.on_event(Event::Tick);
        machine.on_event(Event::HealthObserved { unhealthy: vec![] });
        machine.on_event(Event::Tick);
        assert_eq!(machine.state(), ControlState::Disrupting);

        let actions = machine.on_event(Event::BatchResolved);
        assert!(actions.is_empty());
        assert_eq!(machine.state(), ControlState::Idle);
    }

    #[test]
    fn three_healthy_polls_fire_twice_not_thrice() {
        // T1 arms, T2 and T3 disrupt: the first healthy observation only
        // arms, it never fires on its own tick.
        let mut machine = ControlMachine::new();
        let mut disruptions = 0;

        for _ in 0..5 {
            for action in machine.on_event(Event::Tick) {
                match action {
                    Action::PollFleet => {
                        machine.on_event(Event::HealthObserved { unhealthy: vec![] });
                    }
                    Action::BeginDisruption => {
                        disruptions += 1;
                        machine.on_event(Event::BatchResolved);
                    }
                }
            }
        }

        // Ticks: poll(arm), disrupt, poll(arm), disrupt, poll(arm).
        assert_eq!(disruptions, 2);
    }

    #[test]
    fn shutdown_is_terminal_from_any_state() {
        for warmup in 0..3 {
            let mut machine = ControlMachine::new();
            for _ in 0..warmup {
                machine.on_event(Event::Tick);
            }

            assert!(machine.on_event(Event::ShutdownRequested).is_empty());
            assert_eq!(machine.state(), ControlState::Stopped);

            assert!(machine.on_event(Event::Tick).is_empty());
            assert!(machine.on_event(Event::BatchResolved).is_empty());
            assert_eq!(machine.state(), ControlState::Stopped);
        }
    }

    #[test]
    fn invalid_transitions_keep_state() {
        let mut machine = ControlMachine::new();

        // BatchResolved while idle.
        assert!(machine.on_event(Event::BatchResolved).is_empty());
        assert_eq!(machine.state(), ControlState::Idle);

        // HealthObserved while idle.
        assert!(machine
            .on_event(Event::HealthObserved { unhealthy: vec![] })
            .is_empty());
        assert_eq!(machine.state(), ControlState::Idle);
        // The stray observation must not arm the flag either.
        assert!(!machine.is_armed());

        // Tick while polling.
        machine.on_event(Event::Tick);
        assert!(machine.on_event(Event::Tick).is_empty());
        assert_eq!(machine.state(), ControlState::Polling);
    }
}
