//! finger_party — interactive entry point.

use finger_party::app::{run, PartyConfig};
use touch_session::Mode;

use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Finger Party — the multi-touch decision maker          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Everyone puts a finger down. Hold still for five seconds");
    println!("  and the game picks a winner — or deals everyone into teams.");
    println!();

    let args: Vec<String> = std::env::args().collect();

    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok());

    let cfg = if args.iter().any(|a| a == "--quick") {
        println!("  Quick-start: choose mode\n");
        PartyConfig {
            seed,
            ..PartyConfig::default()
        }
    } else {
        configure_interactively(seed)
    };

    println!();
    println!("  Opening the game window…");
    println!("  Mouse = finger 0, digit keys 1–9 park extra fingers at the cursor.");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively(seed: Option<u64>) -> PartyConfig {
    println!("  Game variant:");
    println!("    1. Choose — one winning finger");
    println!("    2. Teams  — deal every finger into teams");
    let mode = match read_line("    Choice (1–2, default 1): ").trim() {
        "2" => Mode::Teams,
        _ => Mode::Choose,
    };

    let team_count = if mode == Mode::Teams {
        read_line("  Number of teams (default 2): ")
            .trim()
            .parse::<usize>()
            .unwrap_or(2)
            .max(1)
    } else {
        2
    };

    PartyConfig {
        mode,
        team_count,
        seed,
        ..PartyConfig::default()
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
