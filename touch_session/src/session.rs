//! The touch-session state machine.
//!
//! One round of the game is one pass through three phases:
//!
//! | Phase    | Meaning                                             |
//! |----------|-----------------------------------------------------|
//! | `Idle`   | No contacts down; waiting for the first finger.     |
//! | `Open`   | Collecting contacts; the inactivity clock is armed. |
//! | `Locked` | Verdict committed; the contact set is frozen.       |
//!
//! Transitions:
//!
//! ```text
//! Idle --first contact_down--> Open
//! Open --last contact_up-----> Idle          (no verdict)
//! Open --hold window expires-> Locked        (selection runs here)
//! Locked --reveal elapses----> Idle          (registry + verdict cleared)
//! any  --set_mode / set_team_count--> Idle   (explicit abort)
//! ```
//!
//! The session has no clock and no timer of its own. Callers pass
//! `now_ms` into the operations that need it and call [`Session::tick`]
//! once per frame; both the inactivity hold and the auto-reset deadline
//! are evaluated there, on the same scheduling source that drives
//! rendering. Randomness is injected as an [`Rng`] at construction, so
//! a seeded session replays identically.

use rand::Rng;

use crate::registry::{Contact, ContactId, TouchRegistry, DEFAULT_CAPACITY};
use crate::select::{self, Mode, Verdict};

/// Inactivity window: a round locks once no contact has been added or
/// removed for longer than this.
pub const HOLD_MS: u64 = 5000;

/// Reveal window: how long a locked verdict stays on screen before the
/// session resets itself.
pub const REVEAL_MS: u64 = 10_000;

// ════════════════════════════════════════════════════════════════════════════
// Phase
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Open,
    Locked,
}

// ════════════════════════════════════════════════════════════════════════════
// SessionConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Maximum concurrent contacts; later fingers are ignored.
    pub capacity:   usize,
    /// Inactivity window before a lock, in milliseconds.
    pub hold_ms:    u64,
    /// Reveal window before the automatic reset, in milliseconds.
    pub reveal_ms:  u64,
    pub mode:       Mode,
    /// Requested team count; clamped to the contact count at lock time.
    pub team_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            capacity:   DEFAULT_CAPACITY,
            hold_ms:    HOLD_MS,
            reveal_ms:  REVEAL_MS,
            mode:       Mode::Choose,
            team_count: 2,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Inactivity detector
// ════════════════════════════════════════════════════════════════════════════

/// Pure lock predicate, evaluated once per tick.
///
/// A session locks only while `Open`, only with at least one contact
/// down, and only once the time since the last structural change
/// (add or remove, never move) strictly exceeds the hold window.
pub fn should_lock(
    phase: Phase,
    contact_count: usize,
    last_activity_ms: u64,
    now_ms: u64,
    hold_ms: u64,
) -> bool {
    phase == Phase::Open
        && contact_count > 0
        && now_ms.saturating_sub(last_activity_ms) > hold_ms
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

/// One game instance: registry, phase, timers and the injected RNG.
///
/// All mutation happens through the methods below on a single logical
/// thread; nothing here is shared or locked.
pub struct Session<R: Rng> {
    registry:          TouchRegistry,
    phase:             Phase,
    verdict:           Option<Verdict>,
    last_activity_ms:  u64,
    reset_deadline_ms: Option<u64>,
    config:            SessionConfig,
    rng:               R,
}

impl<R: Rng> Session<R> {
    pub fn new(mut config: SessionConfig, rng: R) -> Self {
        config.team_count = config.team_count.max(1);
        Session {
            registry:          TouchRegistry::new(config.capacity),
            phase:             Phase::Idle,
            verdict:           None,
            last_activity_ms:  0,
            reset_deadline_ms: None,
            config,
            rng,
        }
    }

    // ── input events ─────────────────────────────────────────────────────

    /// A finger landed. Opens the session on the first contact; ignored
    /// entirely while locked. A rejected contact (capacity) is dropped
    /// silently and does not touch the activity clock.
    pub fn contact_down(&mut self, id: ContactId, x: f32, y: f32, now_ms: u64) {
        if self.phase == Phase::Locked {
            return;
        }
        if self.registry.get(id).is_some() {
            // Trailing duplicate down from the hardware: position only.
            self.registry.move_to(id, x, y);
            return;
        }
        if self.registry.add(id, x, y).is_ok() {
            self.last_activity_ms = now_ms;
            self.phase = Phase::Open;
        }
    }

    /// A finger moved. Never touches the activity clock: dragging must
    /// not postpone the lock, only landing and lifting do.
    pub fn contact_move(&mut self, id: ContactId, x: f32, y: f32) {
        if self.phase == Phase::Locked {
            return;
        }
        self.registry.move_to(id, x, y);
    }

    /// A finger lifted. Emptying the registry returns the session to
    /// `Idle` without a verdict; ignored while locked so the frozen
    /// snapshot survives trailing releases.
    pub fn contact_up(&mut self, id: ContactId, now_ms: u64) {
        if self.phase == Phase::Locked {
            return;
        }
        if self.registry.remove(id) {
            self.last_activity_ms = now_ms;
            if self.registry.is_empty() {
                self.phase = Phase::Idle;
            }
        }
    }

    /// Contact cancellation is indistinguishable from a lift.
    pub fn contact_cancel(&mut self, id: ContactId, now_ms: u64) {
        self.contact_up(id, now_ms);
    }

    // ── external controls ────────────────────────────────────────────────

    /// Switch game variant. Aborts whatever round is in flight.
    pub fn set_mode(&mut self, mode: Mode) {
        self.config.mode = mode;
        self.reset();
    }

    /// Change the requested team count (floored at one team). Aborts
    /// whatever round is in flight.
    pub fn set_team_count(&mut self, count: usize) {
        self.config.team_count = count.max(1);
        self.reset();
    }

    /// Clear everything and return to `Idle`. Idempotent.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.verdict = None;
        self.reset_deadline_ms = None;
        self.phase = Phase::Idle;
    }

    // ── per-frame evaluation ─────────────────────────────────────────────

    /// Evaluate timers. Called once per frame by the driving loop,
    /// after input events have been applied.
    pub fn tick(&mut self, now_ms: u64) {
        match self.phase {
            Phase::Open => {
                if should_lock(
                    self.phase,
                    self.registry.len(),
                    self.last_activity_ms,
                    now_ms,
                    self.config.hold_ms,
                ) {
                    self.lock(now_ms);
                }
            }
            Phase::Locked => {
                if let Some(deadline) = self.reset_deadline_ms {
                    if now_ms >= deadline {
                        self.reset();
                    }
                }
            }
            Phase::Idle => {}
        }
    }

    /// Commit the round: snapshot the registry, run the selection
    /// engine, freeze. Entering `Locked` always replaces the reset
    /// deadline, so a stale deadline can never fire into a new round.
    fn lock(&mut self, now_ms: u64) {
        let snapshot = self.registry.snapshot();
        let verdict = select::decide(
            &mut self.rng,
            &snapshot,
            self.config.mode,
            self.config.team_count,
        );
        if let Verdict::Winner { id } = verdict {
            self.registry.set_sole_active(id);
        }
        self.verdict = Some(verdict);
        self.reset_deadline_ms = Some(now_ms + self.config.reveal_ms);
        self.phase = Phase::Locked;
    }

    // ── accessors for the presentation layer ─────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Contact set in ascending id order; frozen while locked.
    pub fn snapshot(&self) -> Vec<Contact> {
        self.registry.snapshot()
    }

    pub fn contact_count(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fraction of the hold window already consumed, for countdown
    /// rendering. `None` unless the session is open with contacts down.
    pub fn lock_progress(&self, now_ms: u64) -> Option<f32> {
        if self.phase != Phase::Open || self.registry.is_empty() {
            return None;
        }
        if self.config.hold_ms == 0 {
            return Some(1.0);
        }
        let elapsed = now_ms.saturating_sub(self.last_activity_ms) as f32;
        Some((elapsed / self.config.hold_ms as f32).clamp(0.0, 1.0))
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

    fn make_session(mode: Mode) -> Session<StdRng> {
        let config = SessionConfig {
            mode,
            ..SessionConfig::default()
        };
        Session::new(config, StdRng::seed_from_u64(42))
    }

    fn ids(session: &Session<StdRng>) -> Vec<ContactId> {
        session.snapshot().iter().map(|c| c.id).collect()
    }

    // ── detector ─────────────────────────────────────────────────────────

    #[test]
    fn should_lock_truth_table() {
        assert!(should_lock(Phase::Open, 3, 0, 5001, 5000));
        assert!(!should_lock(Phase::Open, 3, 0, 5000, 5000), "strict bound");
        assert!(!should_lock(Phase::Open, 0, 0, 9999, 5000), "empty registry");
        assert!(!should_lock(Phase::Idle, 3, 0, 9999, 5000));
        assert!(!should_lock(Phase::Locked, 3, 0, 9999, 5000));
        assert!(!should_lock(Phase::Open, 1, 6000, 5000, 5000), "clock behind");
    }

    // ── phase walk ───────────────────────────────────────────────────────

    #[test]
    fn first_contact_opens_the_session() {
        let mut s = make_session(Mode::Choose);
        assert_eq!(s.phase(), Phase::Idle);
        s.contact_down(0, 10.0, 10.0, 100);
        assert_eq!(s.phase(), Phase::Open);
    }

    #[test]
    fn lifting_the_last_contact_returns_to_idle() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 0.0, 0.0, 100);
        s.contact_down(1, 9.0, 9.0, 200);
        s.contact_up(0, 300);
        assert_eq!(s.phase(), Phase::Open);
        s.contact_up(1, 400);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.verdict().is_none());
    }

    #[test]
    fn cancel_behaves_like_up() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 0.0, 0.0, 100);
        s.contact_cancel(0, 200);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.contact_count(), 0);
    }

    #[test]
    fn three_fingers_then_silence_locks_a_winner() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 1.0, 1.0, 0);
        s.contact_down(1, 2.0, 2.0, 50);
        s.contact_down(2, 3.0, 3.0, 100);

        s.tick(5100);
        assert_eq!(s.phase(), Phase::Open, "hold not elapsed yet");

        s.tick(5101);
        assert_eq!(s.phase(), Phase::Locked);
        match s.verdict() {
            Some(Verdict::Winner { id }) => assert!([0, 1, 2].contains(id)),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn winner_stays_active_and_losers_are_dimmed() {
        let mut s = make_session(Mode::Choose);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        let winner = match s.verdict() {
            Some(Verdict::Winner { id }) => *id,
            other => panic!("unexpected verdict {:?}", other),
        };
        for c in s.snapshot() {
            assert_eq!(c.active, c.id == winner, "contact {}", c.id);
        }
    }

    #[test]
    fn team_lock_partitions_all_five_fingers() {
        let mut s = make_session(Mode::Teams);
        for id in 0..5 {
            s.contact_down(id, id as f32, 0.0, 0);
        }
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked);

        let teams = match s.verdict() {
            Some(Verdict::Teams { teams }) => teams.clone(),
            other => panic!("unexpected verdict {:?}", other),
        };
        assert_eq!(teams.len(), 2);
        let mut sizes: Vec<usize> = teams.iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);

        let mut seen: Vec<ContactId> = teams.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);

        // Team mode dims nobody.
        assert!(s.snapshot().iter().all(|c| c.active));
    }

    #[test]
    fn team_count_is_clamped_to_contact_count_at_lock() {
        let mut s = make_session(Mode::Teams);
        s.set_team_count(6);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        match s.verdict() {
            Some(Verdict::Teams { teams }) => assert_eq!(teams.len(), 3),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    // ── the activity clock ───────────────────────────────────────────────

    #[test]
    fn moves_do_not_postpone_the_lock() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 0.0, 0.0, 0);
        // Continuous dragging right up to the boundary.
        for t in (500..5000).step_by(500) {
            s.contact_move(0, t as f32, 0.0);
            s.tick(t);
            assert_eq!(s.phase(), Phase::Open, "t={}", t);
        }
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked);
    }

    #[test]
    fn adds_and_removes_rearm_the_hold_window() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 0.0, 0.0, 0);
        s.contact_down(1, 1.0, 1.0, 3000);
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Open, "second landing re-armed the clock");

        s.contact_up(1, 6000);
        s.tick(11_000);
        assert_eq!(s.phase(), Phase::Open, "lift re-armed the clock");
        s.tick(11_001);
        assert_eq!(s.phase(), Phase::Locked);
    }

    #[test]
    fn rejected_eleventh_finger_does_not_rearm_the_clock() {
        let mut s = make_session(Mode::Choose);
        for id in 0..10 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.contact_down(10, 9.0, 9.0, 4000);
        assert_eq!(s.contact_count(), 10);
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked, "failed admission is not activity");
    }

    // ── the frozen window ────────────────────────────────────────────────

    #[test]
    fn locked_session_ignores_new_fingers() {
        let mut s = make_session(Mode::Choose);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        let verdict_before = s.verdict().cloned();

        s.contact_down(7, 50.0, 50.0, 5200);
        assert_eq!(ids(&s), vec![0, 1, 2]);
        assert_eq!(s.verdict().cloned(), verdict_before);
    }

    #[test]
    fn frozen_snapshot_survives_a_physical_release() {
        let mut s = make_session(Mode::Choose);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked);

        // The player lifts a finger during the reveal; the committed
        // result keeps displaying all three contacts.
        s.contact_up(1, 6000);
        s.contact_move(2, 99.0, 99.0);
        assert_eq!(ids(&s), vec![0, 1, 2]);
        let frozen = s.snapshot();
        assert!(frozen.iter().find(|c| c.id == 2).unwrap().x != 99.0);
    }

    #[test]
    fn reveal_window_elapses_into_a_clean_idle() {
        let mut s = make_session(Mode::Choose);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001); // locks; deadline = 15001

        s.tick(15_000);
        assert_eq!(s.phase(), Phase::Locked);

        s.tick(15_001);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.contact_count(), 0);
        assert!(s.verdict().is_none());
    }

    // ── aborts and resets ────────────────────────────────────────────────

    #[test]
    fn mode_change_aborts_an_open_round() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(0, 0.0, 0.0, 0);
        s.set_mode(Mode::Teams);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.contact_count(), 0);
        assert_eq!(s.config().mode, Mode::Teams);
    }

    #[test]
    fn team_count_change_aborts_a_locked_round() {
        let mut s = make_session(Mode::Teams);
        for id in 0..4 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked);

        s.set_team_count(3);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.verdict().is_none());
        assert_eq!(s.config().team_count, 3);
    }

    #[test]
    fn set_team_count_floors_at_one() {
        let mut s = make_session(Mode::Teams);
        s.set_team_count(0);
        assert_eq!(s.config().team_count, 1);
    }

    #[test]
    fn reset_is_idempotent_and_disarms_the_deadline() {
        let mut s = make_session(Mode::Choose);
        for id in 0..3 {
            s.contact_down(id, 0.0, 0.0, 0);
        }
        s.tick(5001);
        assert_eq!(s.phase(), Phase::Locked);

        s.reset();
        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.contact_count(), 0);
        assert!(s.verdict().is_none());

        // No stale deadline may fire into the next round.
        s.contact_down(0, 0.0, 0.0, 20_000);
        s.tick(20_001);
        assert_eq!(s.phase(), Phase::Open);
    }

    // ── presentation accessors ───────────────────────────────────────────

    #[test]
    fn lock_progress_tracks_the_hold_window() {
        let mut s = make_session(Mode::Choose);
        assert_eq!(s.lock_progress(0), None);

        s.contact_down(0, 0.0, 0.0, 1000);
        let halfway = s.lock_progress(3500).unwrap();
        assert!((halfway - 0.5).abs() < 1e-6);

        s.tick(6001);
        assert_eq!(s.phase(), Phase::Locked);
        assert_eq!(s.lock_progress(6001), None);
    }

    #[test]
    fn color_index_survives_dragging() {
        let mut s = make_session(Mode::Choose);
        s.contact_down(13, 0.0, 0.0, 0);
        s.contact_move(13, 77.0, 3.0);
        let c = &s.snapshot()[0];
        assert_eq!(c.color_index, 3);
        assert_eq!((c.x, c.y), (77.0, 3.0));
    }
}
