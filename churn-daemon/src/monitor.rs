//! The churn monitor: polls fleet health and disrupts on full recovery.
//!
//! A single control task drives the state machine sequentially: poll,
//! decide, disrupt. Within a disruption the restart executor fans out one
//! task per target, but the loop itself never overlaps two polls or two
//! cycles, and a cycle's leader resolution always happens strictly before
//! its selection. Shutdown is checked only at tick boundaries, so an
//! in-flight batch drains fully instead of leaking unresolved restarts.

use crate::config::Config;
use churn_client::{resolve_leader, restart_batch, LeaderProbe, RuntimeProbe};
use churn_core::{select_targets, Action, ControlMachine, ControlState, Event, Fleet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Drives the poll/disrupt cycle for one fleet.
pub struct Monitor {
    fleet: Fleet,
    batch_size: usize,
    consensus_prefix: String,
    interval: Duration,
    runtime: Arc<dyn RuntimeProbe>,
    leadership: Arc<dyn LeaderProbe>,
    machine: ControlMachine,
    rng: StdRng,
}

impl Monitor {
    /// Build a monitor from configuration and probe implementations.
    pub fn new(
        config: &Config,
        fleet: Fleet,
        runtime: Arc<dyn RuntimeProbe>,
        leadership: Arc<dyn LeaderProbe>,
    ) -> Self {
        Self {
            fleet,
            batch_size: config.disruption.restart_batch_size,
            consensus_prefix: config.fleet.consensus_prefix.clone(),
            interval: Duration::from_millis(config.disruption.interval_ms),
            runtime,
            leadership,
            machine: ControlMachine::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Current control-loop state.
    pub fn state(&self) -> ControlState {
        self.machine.state()
    }

    /// Run until the shutdown signal flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let names: Vec<&str> = self.fleet.members().iter().map(|m| m.as_str()).collect();
        tracing::info!(
            "starting container monitor: fleet={:?}, restart_batch_size={}",
            names,
            self.batch_size
        );
        if self.batch_size == 0 {
            tracing::info!("restart_batch_size = 0, monitoring only");
        }

        let mut ticker = tokio::time::interval(self.interval);
        // A slow disruption must not be followed by a burst of ticks.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    self.machine.on_event(Event::ShutdownRequested);
                    tracing::info!("shutdown requested, stopping monitor");
                    return;
                }
                _ = ticker.tick() => {
                    self.step().await;
                }
            }
        }
    }

    /// Execute one tick: a health poll or a disruption cycle.
    pub async fn step(&mut self) {
        for action in self.machine.on_event(Event::Tick) {
            match action {
                Action::PollFleet => self.poll().await,
                Action::BeginDisruption => self.disrupt().await,
            }
        }
    }

    async fn poll(&mut self) {
        let mut unhealthy = Vec::new();

        for member in self.fleet.members() {
            let running = match self.runtime.is_running(member).await {
                Ok(running) => running,
                Err(e) => {
                    // A member we cannot observe counts as down.
                    tracing::debug!("health check failed for {}: {}", member, e);
                    false
                }
            };

            tracing::debug!("health check: container={} running={}", member, running);

            if !running {
                unhealthy.push(member.clone());
            }
        }

        if unhealthy.is_empty() {
            tracing::debug!("all containers are healthy");
        } else {
            let names: Vec<&str> = unhealthy.iter().map(|m| m.as_str()).collect();
            tracing::info!("unhealthy containers: {:?}", names);
        }

        self.machine.on_event(Event::HealthObserved { unhealthy });
    }

    async fn disrupt(&mut self) {
        let leader =
            resolve_leader(self.leadership.as_ref(), &self.fleet, &self.consensus_prefix).await;

        let targets = select_targets(
            self.fleet.members(),
            self.batch_size,
            leader.as_ref(),
            &mut self.rng,
        );

        if targets.is_empty() {
            tracing::debug!("empty target batch, nothing to disrupt");
        } else {
            restart_batch(Arc::clone(&self.runtime), &targets).await;
        }

        self.machine.on_event(Event::BatchResolved);
    }
}
