//! Audio cues on their own thread.
//!
//! Cues are fire-and-forget: the game loop sends a [`Cue`] and never
//! waits. With the `midi` feature the cues go out over the first
//! available MIDI port; otherwise (or when no port exists) they fall
//! back to a silent output and the game plays on.

use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

// ════════════════════════════════════════════════════════════════════════════
// Cue — what the game wants to hear
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// A finger landed: one short tap, pitched by the palette slot.
    Tap { color_index: usize },
    /// The round locked: a quick rising arpeggio.
    Lock,
    /// The session reset: one low note.
    Reset,
    /// Terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── null backend (default, and the fallback when no port is available) ──────

struct NullOut;
impl MidiOut for NullOut {
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8) {}
}

// ── midir backend (feature = "midi") ────────────────────────────────────────

#[cfg(feature = "midi")]
struct MidirOut {
    conn: midir::MidiOutputConnection,
}

#[cfg(feature = "midi")]
impl MidiOut for MidirOut {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

/// Open the first available MIDI output port, preferring a softsynth.
/// Falls back to `NullOut` with a warning; a missing port never fails
/// the game.
#[cfg(feature = "midi")]
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("finger_party_chime") {
        Ok(m) => m,
        Err(e) => {
            eprintln!("[chime] MIDI init error: {} — cues will be silent", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        eprintln!("[chime] No MIDI output ports found — cues will be silent.");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid")
                        || n.contains("timidity")
                        || n.contains("microsoft")
                        || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    eprintln!("[chime] Opening MIDI port: {}", name);

    match midi_out.connect(port, "finger-party-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            eprintln!("[chime] Failed to connect: {} — cues will be silent", e);
            Box::new(NullOut)
        }
    }
}

#[cfg(not(feature = "midi"))]
fn open_midi_output() -> Box<dyn MidiOut> {
    Box::new(NullOut)
}

// ════════════════════════════════════════════════════════════════════════════
// Chime — handle to the cue thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Chime {
    tx: Sender<Cue>,
}

impl Chime {
    /// Spawn the cue thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Cue>();
        thread::spawn(move || {
            let mut midi = open_midi_output();
            for cue in rx {
                match cue {
                    Cue::Tap { color_index } => {
                        // One pentatonic step per palette slot.
                        const STEPS: [u8; 5] = [0, 2, 4, 7, 9];
                        let note =
                            72 + STEPS[color_index % STEPS.len()] + 12 * (color_index / 5) as u8;
                        strike(midi.as_mut(), note, 90, 60);
                    }
                    Cue::Lock => {
                        for note in [60u8, 64, 67, 72] {
                            strike(midi.as_mut(), note, 100, 90);
                        }
                    }
                    Cue::Reset => {
                        strike(midi.as_mut(), 48, 70, 200);
                    }
                    Cue::Quit => return,
                }
            }
        });
        Chime { tx }
    }

    pub fn play(&self, cue: Cue) {
        let _ = self.tx.send(cue);
    }
}

impl Drop for Chime {
    fn drop(&mut self) {
        let _ = self.tx.send(Cue::Quit);
    }
}

fn strike(midi: &mut dyn MidiOut, note: u8, velocity: u8, hold_ms: u64) {
    midi.note_on(0, note, velocity);
    thread::sleep(Duration::from_millis(hold_ms));
    midi.note_off(0, note);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
