//! Random target selection with leader force-inclusion.

use crate::fleet::ContainerId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Choose which containers to disrupt this cycle.
///
/// Produces a uniformly random permutation of `fleet` and returns its
/// first `min(batch_size, fleet.len())` entries, preserving that order.
///
/// If a consensus `leader` was resolved and does not already land inside
/// the first `batch_size` positions of the permutation, it overwrites
/// position 0. The controller pulls the leader *into* the batch to
/// exercise failover rather than shielding it from churn.
///
/// Randomness comes from the injected `rng`, so tests can seed it; each
/// production invocation draws fresh entropy and no reproducibility
/// across cycles is intended.
pub fn select_targets<R: Rng + ?Sized>(
    fleet: &[ContainerId],
    batch_size: usize,
    leader: Option<&ContainerId>,
    rng: &mut R,
) -> Vec<ContainerId> {
    if fleet.is_empty() {
        return Vec::new();
    }

    let mut permutation = fleet.to_vec();
    permutation.shuffle(rng);

    if let Some(leader) = leader {
        let window = batch_size.min(permutation.len());
        if !permutation[..window].contains(leader) {
            permutation[0] = leader.clone();
        }
    }

    let take = batch_size.min(permutation.len());
    permutation.truncate(take);
    permutation
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fleet(names: &[&str]) -> Vec<ContainerId> {
        names.iter().map(|n| ContainerId::from(*n)).collect()
    }

    #[test]
    fn empty_fleet_yields_empty_batch() {
        let mut rng = StdRng::seed_from_u64(1);
        let targets = select_targets(&[], 3, None, &mut rng);
        assert!(targets.is_empty());
    }

    #[test]
    fn zero_batch_size_yields_empty_batch() {
        let mut rng = StdRng::seed_from_u64(1);
        let members = fleet(&["etcd-1", "etcd-2", "etcd-3"]);
        let leader = ContainerId::from("etcd-2");

        let targets = select_targets(&members, 0, Some(&leader), &mut rng);
        assert!(targets.is_empty());
    }

    #[test]
    fn batch_length_members_and_uniqueness() {
        let members = fleet(&["a", "b", "c", "d", "e"]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for batch_size in 0..=7 {
                let targets = select_targets(&members, batch_size, None, &mut rng);

                assert_eq!(targets.len(), batch_size.min(members.len()));

                let unique: HashSet<&ContainerId> = targets.iter().collect();
                assert_eq!(unique.len(), targets.len(), "duplicates in batch");

                for target in &targets {
                    assert!(members.contains(target), "{target} not a fleet member");
                }
            }
        }
    }

    #[test]
    fn leader_always_included_when_batch_nonzero() {
        let members = fleet(&["etcd-1", "etcd-2", "etcd-3", "etcd-4", "etcd-5"]);
        let leader = ContainerId::from("etcd-3");

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            for batch_size in 1..=5 {
                let targets = select_targets(&members, batch_size, Some(&leader), &mut rng);
                assert!(
                    targets.contains(&leader),
                    "leader missing from batch (seed={seed}, batch={batch_size})"
                );
            }
        }
    }

    #[test]
    fn leader_inclusion_never_introduces_duplicates() {
        let members = fleet(&["etcd-1", "etcd-2", "etcd-3"]);
        let leader = ContainerId::from("etcd-1");

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let targets = select_targets(&members, 2, Some(&leader), &mut rng);

            let unique: HashSet<&ContainerId> = targets.iter().collect();
            assert_eq!(unique.len(), targets.len());
        }
    }

    #[test]
    fn batch_of_one_is_exactly_the_leader() {
        let members = fleet(&["etcd-1", "etcd-2", "etcd-3"]);
        let leader = ContainerId::from("etcd-2");

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let targets = select_targets(&members, 1, Some(&leader), &mut rng);
            assert_eq!(targets, vec![leader.clone()]);
        }
    }

    #[test]
    fn oversized_batch_returns_whole_fleet() {
        let members = fleet(&["svc-a", "svc-b"]);
        let mut rng = StdRng::seed_from_u64(42);

        let targets = select_targets(&members, 5, None, &mut rng);

        let got: HashSet<&ContainerId> = targets.iter().collect();
        let want: HashSet<&ContainerId> = members.iter().collect();
        assert_eq!(got, want);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let members = fleet(&["a", "b", "c", "d"]);

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);

        let first = select_targets(&members, 2, None, &mut rng1);
        let second = select_targets(&members, 2, None, &mut rng2);
        assert_eq!(first, second);
    }
}
