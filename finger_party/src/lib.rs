//! # finger_party
//!
//! The multi-touch party picker built on [`touch_session`]: players put
//! fingers on the surface, a quiet spell locks the round, and the game
//! crowns one finger or deals everyone into teams.
//!
//! ## Round shape
//!
//! Fingers land and drag freely while the session is collecting. Five
//! seconds after the last finger lands or lifts, the round locks: the
//! selection engine runs once, the verdict is revealed, and ten seconds
//! later the game resets itself for the next round.
//!
//! ## Input
//!
//! The default touch source is a simulation driven by the game window:
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse drag (left button) | Contact 0 — land, drag, lift |
//! | Digit key `1`–`9` | Park / lift a sticky contact at the cursor |
//! | `M` | Toggle choose / team mode (aborts the round) |
//! | `Up` / `Down` | Adjust the team count (aborts the round) |
//! | `Esc` | Abort the round |
//! | `Q` | Quit |
//!
//! A real touch surface slots in behind the
//! [`TouchSource`](touch_source::TouchSource) trait.
//!
//! ## Feature flags
//!
//! * (default) — silent audio cues; no MIDI toolchain needed.
//! * `midi` — play the tap/lock/reset cues through the first available
//!   MIDI output port via `midir`.

pub mod app;
pub mod chime;
pub mod marker;
pub mod palette;
pub mod touch_source;
pub mod visualizer;
