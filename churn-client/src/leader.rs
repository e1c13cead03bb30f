//! Leader resolution for consensus-group fleets.

use crate::probe::LeaderProbe;
use churn_core::{ContainerId, Fleet};

/// Find which fleet member currently claims consensus leadership.
///
/// Applies only to fleets whose naming matches `prefix`; any other fleet
/// resolves to `None` without issuing a single query. Members are asked
/// in their configured order and the first affirmative answer
/// short-circuits the search. An individual query failure is logged and
/// treated as "not leader".
///
/// The result is fresh for this cycle only. Leadership moves between
/// cycles - not least because the previous cycle may have restarted the
/// leader - so it is never cached.
pub async fn resolve_leader(
    probe: &dyn LeaderProbe,
    fleet: &Fleet,
    prefix: &str,
) -> Option<ContainerId> {
    if !fleet.is_consensus_group(prefix) {
        return None;
    }

    tracing::info!("detected consensus group, trying to identify the leader");

    for member in fleet.members() {
        tracing::debug!("checking if {} is the leader", member);

        match probe.is_leader(member).await {
            Ok(true) => {
                tracing::info!("leader identified: {}", member);
                return Some(member.clone());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("leadership query failed for {}: {}", member, e);
            }
        }
    }

    tracing::info!("no member currently reports leadership");
    None
}
