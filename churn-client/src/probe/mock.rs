//! Mock probes for testing.
//!
//! Allows scripting per-container state and capturing restart attempts
//! for verification.

use super::{LeaderProbe, ProbeError, RuntimeProbe};
use async_trait::async_trait;
use churn_core::ContainerId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Mock probe for testing.
///
/// Containers are running by default; script outages with
/// [`set_running`](MockProbe::set_running) and failures with the
/// `fail_*` methods. Restart attempts are recorded in issue order,
/// including the ones scripted to fail.
#[derive(Debug, Default)]
pub struct MockProbe {
    inner: Arc<Mutex<MockProbeInner>>,
}

#[derive(Debug, Default)]
struct MockProbeInner {
    stopped: HashSet<ContainerId>,
    leader: Option<ContainerId>,
    restarted: Vec<ContainerId>,
    leader_queries: Vec<ContainerId>,
    fail_running: HashSet<ContainerId>,
    fail_restart: HashSet<ContainerId>,
    fail_leader: HashSet<ContainerId>,
}

impl MockProbe {
    /// Create a new mock probe with every container running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a container as running or stopped.
    pub fn set_running(&self, id: &ContainerId, running: bool) {
        let mut inner = self.inner.lock().unwrap();
        if running {
            inner.stopped.remove(id);
        } else {
            inner.stopped.insert(id.clone());
        }
    }

    /// Script which member reports itself leader (or none).
    pub fn set_leader(&self, id: Option<&ContainerId>) {
        let mut inner = self.inner.lock().unwrap();
        inner.leader = id.cloned();
    }

    /// Cause `is_running` to fail for the given container.
    pub fn fail_running_for(&self, id: &ContainerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_running.insert(id.clone());
    }

    /// Cause `restart` to fail for the given container.
    pub fn fail_restart_for(&self, id: &ContainerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_restart.insert(id.clone());
    }

    /// Cause `is_leader` to fail for the given container.
    pub fn fail_leader_for(&self, id: &ContainerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_leader.insert(id.clone());
    }

    /// All restart attempts, in issue order.
    pub fn restarts(&self) -> Vec<ContainerId> {
        let inner = self.inner.lock().unwrap();
        inner.restarted.clone()
    }

    /// All leadership queries, in issue order.
    pub fn leader_queries(&self) -> Vec<ContainerId> {
        let inner = self.inner.lock().unwrap();
        inner.leader_queries.clone()
    }

    /// Clear all scripted state and captured calls.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockProbeInner::default();
    }
}

impl Clone for MockProbe {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RuntimeProbe for MockProbe {
    async fn is_running(&self, id: &ContainerId) -> Result<bool, ProbeError> {
        let inner = self.inner.lock().unwrap();

        if inner.fail_running.contains(id) {
            return Err(ProbeError::Failed(format!("injected is_running failure for {id}")));
        }

        Ok(!inner.stopped.contains(id))
    }

    async fn restart(&self, id: &ContainerId) -> Result<(), ProbeError> {
        let mut inner = self.inner.lock().unwrap();

        // The attempt is recorded even when it fails.
        inner.restarted.push(id.clone());

        if inner.fail_restart.contains(id) {
            return Err(ProbeError::Failed(format!("injected restart failure for {id}")));
        }

        // A successful restart leaves the container running.
        inner.stopped.remove(id);
        Ok(())
    }
}

#[async_trait]
impl LeaderProbe for MockProbe {
    async fn is_leader(&self, id: &ContainerId) -> Result<bool, ProbeError> {
        let mut inner = self.inner.lock().unwrap();

        inner.leader_queries.push(id.clone());

        if inner.fail_leader.contains(id) {
            return Err(ProbeError::Failed(format!("injected is_leader failure for {id}")));
        }

        Ok(inner.leader.as_ref() == Some(id))
    }
}
