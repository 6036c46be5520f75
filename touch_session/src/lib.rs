//! # touch_session
//!
//! The state machine behind a multi-touch picking game: players put
//! fingers on a surface, the session watches for a quiet spell, then
//! commits a random decision over whoever is still down.
//!
//! ## Round shape
//!
//! | Step | What happens |
//! |---|---|
//! | First finger lands | session opens, contacts start collecting |
//! | Fingers land / lift | each structural change re-arms the 5 s hold window |
//! | Hold window expires | session locks; the selection engine runs once |
//! | Reveal window (10 s) | the frozen result is displayed, input is ignored |
//! | Reveal expires | session resets itself to idle; next round can begin |
//!
//! ## Modes
//!
//! * **Choose** picks one winning finger uniformly at random.
//! * **Teams** shuffles every finger (Fisher-Yates) and deals them
//!   round-robin into `k` teams, so team sizes differ by at most one.
//!
//! ## Injection
//!
//! The crate owns no clock and no entropy. Time arrives as explicit
//! `now_ms: u64` arguments driven by the host's frame loop; randomness
//! is any [`rand::Rng`] handed to [`Session::new`]. Seed the generator
//! and replay the event timeline to reproduce a round exactly:
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use touch_session::{Mode, Phase, Session, SessionConfig, Verdict};
//!
//! let mut session = Session::new(SessionConfig::default(), StdRng::seed_from_u64(7));
//! session.contact_down(0, 120.0, 80.0, 0);
//! session.contact_down(1, 300.0, 200.0, 40);
//! session.tick(5041); // quiet for > 5 s after the last landing
//!
//! assert_eq!(session.phase(), Phase::Locked);
//! assert!(matches!(session.verdict(), Some(Verdict::Winner { .. })));
//! ```

pub mod registry;
pub mod select;
pub mod session;

pub use registry::{Contact, ContactId, Rejected, TouchRegistry, DEFAULT_CAPACITY, PALETTE_SIZE};
pub use select::{choose_winner, clamp_team_count, decide, partition_teams, Mode, Verdict};
pub use session::{should_lock, Phase, Session, SessionConfig, HOLD_MS, REVEAL_MS};
