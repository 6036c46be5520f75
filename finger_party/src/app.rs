//! Top-level application state.
//!
//! `AppState` owns the `Session`, the marker animations, the reveal
//! overlay and the chime handle. It processes [`TouchEvent`]s and is
//! ticked once per frame by the run loop, which then renders from the
//! settled state.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use touch_session::{ContactId, Mode, Phase, Session, SessionConfig, Verdict};

use crate::chime::{Chime, Cue};
use crate::marker::{AimMarker, RevealPhase};
use crate::palette;
use crate::touch_source::{spawn_touch_source, SimTouchSource, TouchEvent};
use crate::visualizer::{Scene, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// PartyConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct PartyConfig {
    pub mode: Mode,
    pub team_count: usize,
    /// Inactivity window before a lock, in milliseconds.
    pub hold_ms: u64,
    /// Reveal window before the automatic reset, in milliseconds.
    pub reveal_ms: u64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PartyConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        PartyConfig {
            mode: session.mode,
            team_count: session.team_count,
            hold_ms: session.hold_ms,
            reveal_ms: session.reveal_ms,
            seed: None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    session: Session<StdRng>,

    // ── presentation state ───────────────────────────────────────────────
    markers: BTreeMap<ContactId, AimMarker>,
    reveal: RevealPhase,
    announcement: String,
    pub status: String,

    // ── collaborators ────────────────────────────────────────────────────
    chime: Chime,

    /// Phase seen by the previous tick, for edge detection.
    prev_phase: Phase,
}

impl AppState {
    pub fn new(cfg: PartyConfig) -> Self {
        let session_cfg = SessionConfig {
            mode: cfg.mode,
            team_count: cfg.team_count,
            hold_ms: cfg.hold_ms,
            reveal_ms: cfg.reveal_ms,
            ..SessionConfig::default()
        };
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = Session::new(session_cfg, rng);
        let status = status_line(&session);

        AppState {
            session,
            markers: BTreeMap::new(),
            reveal: RevealPhase::Hidden,
            announcement: String::new(),
            status,
            chime: Chime::spawn(),
            prev_phase: Phase::Idle,
        }
    }

    // ── process one TouchEvent ───────────────────────────────────────────

    pub fn handle_event(&mut self, event: TouchEvent, now_ms: u64) {
        match event {
            TouchEvent::Down { id, x, y } => {
                let before = self.session.contact_count();
                self.session.contact_down(id, x, y, now_ms);
                if self.session.contact_count() > before {
                    self.chime.play(Cue::Tap {
                        color_index: id as usize % touch_session::PALETTE_SIZE,
                    });
                }
            }
            TouchEvent::Move { id, x, y } => self.session.contact_move(id, x, y),
            TouchEvent::Up { id } => self.session.contact_up(id, now_ms),
            TouchEvent::Cancel { id } => self.session.contact_cancel(id, now_ms),
            TouchEvent::ToggleMode => {
                let next = match self.session.config().mode {
                    Mode::Choose => Mode::Teams,
                    Mode::Teams => Mode::Choose,
                };
                self.session.set_mode(next);
                self.clear_overlay();
            }
            TouchEvent::AdjustTeams { delta } => {
                let current = self.session.config().team_count as i64;
                self.session.set_team_count((current + delta as i64).max(1) as usize);
                self.clear_overlay();
            }
            TouchEvent::Abort => {
                self.session.reset();
                self.clear_overlay();
            }
            TouchEvent::Quit => { /* handled in the run loop */ }
        }
        self.status = status_line(&self.session);
    }

    fn clear_overlay(&mut self) {
        self.reveal = RevealPhase::Hidden;
        self.announcement.clear();
        self.prev_phase = Phase::Idle;
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, now_ms: u64) {
        self.session.tick(now_ms);

        // Phase edges: the lock and the automatic reset both happen
        // inside session.tick, so they surface here.
        let phase = self.session.phase();
        if self.prev_phase == Phase::Open && phase == Phase::Locked {
            self.announcement = announce(&self.session);
            self.reveal = RevealPhase::Revealing { progress: 0.0 };
            self.chime.play(Cue::Lock);
            self.status = status_line(&self.session);
        }
        if self.prev_phase == Phase::Locked && phase == Phase::Idle {
            self.announcement.clear();
            self.reveal = RevealPhase::Hidden;
            self.chime.play(Cue::Reset);
            self.status = status_line(&self.session);
        }
        self.prev_phase = phase;

        // Keep one marker per live contact, spawning and dropping as the
        // snapshot changes.
        let snapshot = self.session.snapshot();
        for contact in &snapshot {
            self.markers.entry(contact.id).or_default();
        }
        self.markers
            .retain(|id, _| snapshot.iter().any(|c| c.id == *id));
        for marker in self.markers.values_mut() {
            marker.tick();
        }

        self.reveal.tick();
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn session(&self) -> &Session<StdRng> {
        &self.session
    }

    pub fn markers(&self) -> &BTreeMap<ContactId, AimMarker> {
        &self.markers
    }

    pub fn reveal(&self) -> &RevealPhase {
        &self.reveal
    }

    pub fn announcement(&self) -> &str {
        &self.announcement
    }
}

// ── overlay and status text ──────────────────────────────────────────────────

/// Big overlay line for a committed verdict.
fn announce(session: &Session<StdRng>) -> String {
    match session.verdict() {
        Some(Verdict::Winner { id }) => {
            let color_index = session
                .snapshot()
                .iter()
                .find(|c| c.id == *id)
                .map(|c| c.color_index)
                .unwrap_or(*id as usize % touch_session::PALETTE_SIZE);
            format!("{} wins!", palette::name(color_index))
        }
        Some(Verdict::Teams { teams }) => {
            let rosters: Vec<String> = teams
                .iter()
                .enumerate()
                .map(|(i, team)| {
                    let names: Vec<&str> = team
                        .iter()
                        .map(|id| palette::name(*id as usize % touch_session::PALETTE_SIZE))
                        .collect();
                    format!("team {}: {}", i + 1, names.join(" "))
                })
                .collect();
            rosters.join("  ")
        }
        None => String::new(),
    }
}

fn status_line(session: &Session<StdRng>) -> String {
    let cfg = session.config();
    let mode = match cfg.mode {
        Mode::Choose => "choose one".to_string(),
        Mode::Teams => format!("{} teams", cfg.team_count),
    };
    let phase = match session.phase() {
        Phase::Idle => "waiting",
        Phase::Open => "collecting",
        Phase::Locked => "locked",
    };
    format!(
        "mode: {}   fingers: {}   {}",
        mode,
        session.contact_count(),
        phase
    )
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the simulated touch source and the app state,
/// then drives the event/render loop at ~60 fps: poll window input,
/// drain touch events, tick, render from the settled state.
pub fn run(cfg: PartyConfig) -> Result<(), String> {
    // ── sim touch channel ────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();
    let touch_rx = spawn_touch_source(SimTouchSource { rx: sim_rx });

    // ── visualizer (owns the window and the sim input sender) ───────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── app state and clock ──────────────────────────────────────────────
    let mut app = AppState::new(cfg);
    let start = Instant::now();

    // ── main loop ────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → SimInput → touch-source translator
        if !vis.poll_input() {
            break;
        }

        let now_ms = start.elapsed().as_millis() as u64;

        // 2. Drain touch events
        loop {
            match touch_rx.try_recv() {
                Ok(TouchEvent::Quit) => return Ok(()),
                Ok(event) => app.handle_event(event, now_ms),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Per-frame logic
        app.tick(now_ms);

        // 4. Render
        let snapshot = app.session().snapshot();
        vis.render(&Scene {
            phase: app.phase(),
            contacts: &snapshot,
            markers: app.markers(),
            verdict: app.session().verdict(),
            reveal: app.reveal(),
            lock_progress: app.session().lock_progress(now_ms),
            announcement: app.announcement(),
            status: &app.status,
        });
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app(mode: Mode) -> AppState {
        AppState::new(PartyConfig {
            mode,
            seed: Some(42),
            ..PartyConfig::default()
        })
    }

    fn land(app: &mut AppState, id: ContactId, now: u64) {
        app.handle_event(
            TouchEvent::Down {
                id,
                x: 10.0 * id as f32,
                y: 20.0,
            },
            now,
        );
    }

    #[test]
    fn fingers_open_the_session_and_spawn_markers() {
        let mut app = make_app(Mode::Choose);
        land(&mut app, 0, 0);
        land(&mut app, 1, 100);
        app.tick(200);
        assert_eq!(app.phase(), Phase::Open);
        assert_eq!(app.markers().len(), 2);
    }

    #[test]
    fn lock_edge_reveals_a_winner_announcement() {
        let mut app = make_app(Mode::Choose);
        for id in 0..3 {
            land(&mut app, id, 0);
        }
        app.tick(100);
        assert_eq!(app.announcement(), "");

        app.tick(5001);
        assert_eq!(app.phase(), Phase::Locked);
        assert!(matches!(app.reveal(), RevealPhase::Revealing { .. }));
        assert!(app.announcement().ends_with("wins!"));
    }

    #[test]
    fn team_announcement_lists_every_roster() {
        let mut app = make_app(Mode::Teams);
        for id in 0..5 {
            land(&mut app, id, 0);
        }
        app.tick(5001);
        assert_eq!(app.phase(), Phase::Locked);
        assert!(app.announcement().contains("team 1:"));
        assert!(app.announcement().contains("team 2:"));
    }

    #[test]
    fn auto_reset_clears_the_overlay_and_markers() {
        let mut app = make_app(Mode::Choose);
        for id in 0..3 {
            land(&mut app, id, 0);
        }
        app.tick(5001); // locked; deadline 15001
        assert!(!app.markers().is_empty());

        app.tick(15_001);
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.announcement(), "");
        assert_eq!(*app.reveal(), RevealPhase::Hidden);
        app.tick(15_002);
        assert!(app.markers().is_empty());
    }

    #[test]
    fn markers_follow_lifted_fingers() {
        let mut app = make_app(Mode::Choose);
        land(&mut app, 0, 0);
        land(&mut app, 1, 10);
        app.tick(20);
        assert_eq!(app.markers().len(), 2);

        app.handle_event(TouchEvent::Up { id: 0 }, 30);
        app.tick(40);
        assert_eq!(app.markers().len(), 1);
        assert!(app.markers().contains_key(&1));
    }

    #[test]
    fn mode_toggle_flips_and_aborts() {
        let mut app = make_app(Mode::Choose);
        land(&mut app, 0, 0);
        app.handle_event(TouchEvent::ToggleMode, 100);
        assert_eq!(app.session().config().mode, Mode::Teams);
        assert_eq!(app.phase(), Phase::Idle);
        assert!(app.status.contains("teams"));
    }

    #[test]
    fn team_adjustment_floors_at_one() {
        let mut app = make_app(Mode::Teams);
        app.handle_event(TouchEvent::AdjustTeams { delta: -5 }, 0);
        assert_eq!(app.session().config().team_count, 1);
        app.handle_event(TouchEvent::AdjustTeams { delta: 1 }, 0);
        assert_eq!(app.session().config().team_count, 2);
    }

    #[test]
    fn abort_during_reveal_clears_everything() {
        let mut app = make_app(Mode::Choose);
        for id in 0..3 {
            land(&mut app, id, 0);
        }
        app.tick(5001);
        assert_eq!(app.phase(), Phase::Locked);

        app.handle_event(TouchEvent::Abort, 6000);
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.announcement(), "");
        assert_eq!(*app.reveal(), RevealPhase::Hidden);
    }

    #[test]
    fn status_line_tracks_the_round() {
        let mut app = make_app(Mode::Choose);
        assert!(app.status.contains("waiting"));
        land(&mut app, 0, 0);
        assert!(app.status.contains("fingers: 1"));
        assert!(app.status.contains("collecting"));
    }
}
