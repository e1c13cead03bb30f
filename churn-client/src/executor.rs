//! Concurrent restart execution with barrier semantics.

use crate::probe::{ProbeError, RuntimeProbe};
use churn_core::ContainerId;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of one restart attempt.
#[derive(Debug)]
pub struct RestartOutcome {
    /// The container the attempt targeted.
    pub container: ContainerId,
    /// Success, or the failure diagnostic.
    pub result: Result<(), ProbeError>,
}

impl RestartOutcome {
    /// Whether the attempt succeeded.
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Restart every target concurrently and wait for all attempts to resolve.
///
/// One task per target, joined to completion before returning. This is a
/// best-effort batch, not a transaction: a failed restart is logged with
/// its container and diagnostic, never aborts its siblings, and is not
/// retried - a container that stays down is re-observed as unhealthy by
/// the next poll and may be selected again in a future cycle.
pub async fn restart_batch(
    probe: Arc<dyn RuntimeProbe>,
    targets: &[ContainerId],
) -> Vec<RestartOutcome> {
    if targets.is_empty() {
        return Vec::new();
    }

    let names: Vec<&str> = targets.iter().map(|c| c.as_str()).collect();
    tracing::info!("going to restart {:?}", names);

    let mut tasks = JoinSet::new();
    for container in targets {
        let probe = Arc::clone(&probe);
        let container = container.clone();
        tasks.spawn(async move {
            tracing::info!("attempting to restart {}", container);
            let result = probe.restart(&container).await;
            match &result {
                Ok(()) => tracing::info!("restarted {}", container),
                Err(e) => tracing::error!("failed to restart {}: {}", container, e),
            }
            RestartOutcome { container, result }
        });
    }

    let mut outcomes = Vec::with_capacity(targets.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("restart task panicked: {}", e),
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MockProbe;
    use std::collections::HashSet;

    fn targets(names: &[&str]) -> Vec<ContainerId> {
        names.iter().map(|n| ContainerId::from(*n)).collect()
    }

    #[tokio::test]
    async fn empty_batch_resolves_immediately() {
        let probe = Arc::new(MockProbe::new());
        let outcomes = restart_batch(probe.clone(), &[]).await;
        assert!(outcomes.is_empty());
        assert!(probe.restarts().is_empty());
    }

    #[tokio::test]
    async fn all_targets_are_attempted() {
        let probe = Arc::new(MockProbe::new());
        let batch = targets(&["etcd-1", "etcd-2", "etcd-3"]);

        let outcomes = restart_batch(probe.clone(), &batch).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(RestartOutcome::success));

        let attempted: HashSet<ContainerId> = probe.restarts().into_iter().collect();
        let expected: HashSet<ContainerId> = batch.into_iter().collect();
        assert_eq!(attempted, expected);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_siblings() {
        let probe = Arc::new(MockProbe::new());
        let batch = targets(&["c-1", "c-2", "c-3", "c-4", "c-5"]);
        probe.fail_restart_for(&ContainerId::from("c-3"));

        let outcomes = restart_batch(probe.clone(), &batch).await;

        // All five attempts were issued and all five resolved.
        assert_eq!(outcomes.len(), 5);
        assert_eq!(probe.restarts().len(), 5);

        let failed: Vec<&RestartOutcome> =
            outcomes.iter().filter(|o| !o.success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].container.as_str(), "c-3");
    }
}
