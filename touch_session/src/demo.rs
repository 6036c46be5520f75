//! Scripted walkthrough of the touch-session state machine, with a
//! seeded generator and a hand-advanced clock. Useful as a smoke run
//! and as executable documentation of the round shape.

use rand::rngs::StdRng;
use rand::SeedableRng;

use touch_session::{Mode, Phase, Session, SessionConfig, Verdict};

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "IDLE",
        Phase::Open => "OPEN",
        Phase::Locked => "LOCKED",
    }
}

fn report(label: &str, session: &Session<StdRng>) {
    let ids: Vec<u32> = session.snapshot().iter().map(|c| c.id).collect();
    println!(
        "   {:<28} phase={:<6} contacts={:?}",
        label,
        phase_name(session.phase()),
        ids
    );
}

fn main() {
    println!("\n=== Touch Session Demo (seed 2024) ===\n");

    // ── 1. Choose mode: three fingers, one winner ─────────────────────────
    println!("1. Choose mode, three fingers");
    let mut session = Session::new(SessionConfig::default(), StdRng::seed_from_u64(2024));

    session.contact_down(0, 120.0, 90.0, 0);
    report("finger 0 lands (t=0)", &session);
    session.contact_down(1, 340.0, 210.0, 800);
    report("finger 1 lands (t=800)", &session);
    session.contact_down(2, 500.0, 400.0, 1500);
    report("finger 2 lands (t=1500)", &session);

    session.contact_move(2, 480.0, 390.0);
    report("finger 2 drags (no clock)", &session);

    session.tick(6400);
    report("tick t=6400 (quiet 4.9s)", &session);
    session.tick(6501);
    report("tick t=6501 (quiet 5.0s+)", &session);

    match session.verdict() {
        Some(Verdict::Winner { id }) => println!("   -> winner: finger {}\n", id),
        other => println!("   -> unexpected verdict {:?}\n", other),
    }

    // ── 2. Reveal window runs out, session cleans itself ──────────────────
    println!("2. Automatic reset after the reveal window");
    session.contact_down(9, 10.0, 10.0, 8000);
    report("late finger is ignored", &session);
    session.tick(17_000);
    report("tick t=17000 (reveal over)", &session);
    println!();

    // ── 3. Team mode: six fingers, two teams ──────────────────────────────
    println!("3. Team mode, six fingers into two teams");
    session.set_mode(Mode::Teams);
    session.set_team_count(2);
    for id in 0..6u32 {
        session.contact_down(id, 80.0 * id as f32, 60.0, 20_000 + 100 * id as u64);
    }
    report("six fingers down", &session);
    session.tick(25_600);
    report("tick t=25600 (locked)", &session);

    if let Some(Verdict::Teams { teams }) = session.verdict() {
        for (index, team) in teams.iter().enumerate() {
            println!("   -> team {}: {:?}", index + 1, team);
        }
    }
    println!();

    // ── 4. Abort via a control change ─────────────────────────────────────
    println!("4. Changing the team count aborts the round");
    session.set_team_count(3);
    report("after set_team_count(3)", &session);

    println!("\nDone.\n");
}
