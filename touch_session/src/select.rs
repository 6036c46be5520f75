//! Selection engine: turn a frozen contact snapshot into a verdict.
//!
//! Runs exactly once per round, at the moment the session locks. All
//! randomness comes from the generator the caller injects, so a fixed
//! seed replays the same draw.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::registry::{Contact, ContactId};

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

/// Which game variant a lock resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Pick a single winning finger.
    Choose,
    /// Partition every finger into teams.
    Teams,
}

// ════════════════════════════════════════════════════════════════════════════
// Verdict
// ════════════════════════════════════════════════════════════════════════════

/// The committed outcome of a round. Built once at lock time and held
/// unchanged until the session resets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Choose mode: the one contact that survives.
    Winner { id: ContactId },
    /// Team mode: team 0 first; members appear in assignment order,
    /// not sorted by id, so a replay with the same seed lists them
    /// identically.
    Teams { teams: Vec<Vec<ContactId>> },
}

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

/// Clamp a requested team count to something dealable: at least one
/// team, never more teams than contacts.
pub fn clamp_team_count(requested: usize, contact_count: usize) -> usize {
    requested.max(1).min(contact_count.max(1))
}

/// One uniform draw over the snapshot.
///
/// The snapshot must be non-empty; the session never locks an empty
/// registry.
pub fn choose_winner<R: Rng>(rng: &mut R, snapshot: &[Contact]) -> Verdict {
    let pick = rng.gen_range(0..snapshot.len());
    Verdict::Winner {
        id: snapshot[pick].id,
    }
}

/// Shuffle the snapshot uniformly (Fisher-Yates), then deal the
/// permuted contacts round-robin into `k` teams: permuted position `p`
/// lands in team `p % k`. Team sizes therefore differ by at most one
/// and every contact is placed exactly once.
///
/// The snapshot must be non-empty.
pub fn partition_teams<R: Rng>(rng: &mut R, snapshot: &[Contact], requested: usize) -> Verdict {
    let k = clamp_team_count(requested, snapshot.len());
    let mut ids: Vec<ContactId> = snapshot.iter().map(|c| c.id).collect();
    ids.shuffle(rng);

    let mut teams: Vec<Vec<ContactId>> = vec![Vec::new(); k];
    for (position, id) in ids.into_iter().enumerate() {
        teams[position % k].push(id);
    }
    Verdict::Teams { teams }
}

/// Dispatch on the configured mode.
pub fn decide<R: Rng>(
    rng: &mut R,
    snapshot: &[Contact],
    mode: Mode,
    team_count: usize,
) -> Verdict {
    match mode {
        Mode::Choose => choose_winner(rng, snapshot),
        Mode::Teams => partition_teams(rng, snapshot, team_count),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn contacts(ids: &[ContactId]) -> Vec<Contact> {
        ids.iter()
            .map(|&id| Contact {
                id,
                x: 0.0,
                y: 0.0,
                color_index: id as usize % crate::registry::PALETTE_SIZE,
                active: true,
            })
            .collect()
    }

    #[test]
    fn winner_is_a_member_of_the_snapshot() {
        let snap = contacts(&[1, 2, 3]);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            match choose_winner(&mut rng, &snap) {
                Verdict::Winner { id } => assert!((1..=3).contains(&id)),
                other => panic!("unexpected verdict {:?}", other),
            }
        }
    }

    #[test]
    fn winner_is_deterministic_for_a_fixed_seed() {
        let snap = contacts(&[1, 2, 3]);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(choose_winner(&mut a, &snap), choose_winner(&mut b, &snap));
    }

    #[test]
    fn partition_is_deterministic_for_a_fixed_seed() {
        let snap = contacts(&[0, 1, 2, 3, 4]);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            partition_teams(&mut a, &snap, 2),
            partition_teams(&mut b, &snap, 2)
        );
    }

    #[test]
    fn partition_balances_and_covers_every_contact() {
        let mut rng = StdRng::seed_from_u64(99);
        for n in 1..=10usize {
            let ids: Vec<ContactId> = (0..n as ContactId).collect();
            let snap = contacts(&ids);
            for requested in 1..=12usize {
                let verdict = partition_teams(&mut rng, &snap, requested);
                let teams = match verdict {
                    Verdict::Teams { teams } => teams,
                    other => panic!("unexpected verdict {:?}", other),
                };
                assert_eq!(teams.len(), clamp_team_count(requested, n));

                let total: usize = teams.iter().map(Vec::len).sum();
                assert_eq!(total, n, "n={} k={}", n, requested);

                let largest = teams.iter().map(Vec::len).max().unwrap();
                let smallest = teams.iter().map(Vec::len).min().unwrap();
                assert!(largest - smallest <= 1, "n={} k={}", n, requested);

                let mut seen: Vec<ContactId> =
                    teams.iter().flatten().copied().collect();
                seen.sort_unstable();
                assert_eq!(seen, ids, "n={} k={}", n, requested);
            }
        }
    }

    #[test]
    fn single_team_takes_everyone() {
        let snap = contacts(&[4, 8, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        match partition_teams(&mut rng, &snap, 1) {
            Verdict::Teams { teams } => {
                assert_eq!(teams.len(), 1);
                assert_eq!(teams[0].len(), 3);
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_team_count(0, 5), 1);
        assert_eq!(clamp_team_count(3, 5), 3);
        assert_eq!(clamp_team_count(8, 5), 5);
        assert_eq!(clamp_team_count(2, 1), 1);
    }
}
