//! Touch input — simulated from the window, real hardware behind the seam.
//!
//! The public interface is [`TouchEvent`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether events came from a real touch
//! surface or the mouse/keyboard simulator.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use touch_session::ContactId;

// ════════════════════════════════════════════════════════════════════════════
// TouchEvent
// ════════════════════════════════════════════════════════════════════════════

/// An input event emitted by a touch source.
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEvent {
    /// A contact landed at (x, y).
    Down { id: ContactId, x: f32, y: f32 },

    /// A contact dragged to (x, y).
    Move { id: ContactId, x: f32, y: f32 },

    /// A contact lifted.
    Up { id: ContactId },

    /// The source lost track of a contact. Treated exactly like `Up`.
    Cancel { id: ContactId },

    /// Flip between choose and team mode. Aborts the round in flight.
    ToggleMode,

    /// Adjust the requested team count by ±1. Aborts the round in flight.
    AdjustTeams { delta: i32 },

    /// Abort the round without changing any setting.
    Abort,

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// TouchSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TouchEvent`]s over a channel.
pub trait TouchSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TouchEvent>);
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Spawn a touch source on its own thread and return the receiving end.
pub fn spawn_touch_source<S: TouchSource>(source: S) -> Receiver<TouchEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimTouchSource — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Left button pressed at (x, y).
    PointerDown { x: f32, y: f32 },
    /// Cursor moved to (x, y) with the button held.
    PointerDrag { x: f32, y: f32 },
    /// Left button released.
    PointerUp,
    /// Digit key 1–9 pressed with the cursor at (x, y): parks a sticky
    /// contact there, or lifts it if that slot is already parked.
    ParkToggle { slot: u8, x: f32, y: f32 },
    /// M key.
    ToggleMode,
    /// Up/Down arrows.
    AdjustTeams { delta: i32 },
    /// Escape.
    Abort,
    /// Q key.
    Quit,
}

/// Touch source driven by [`SimInput`] events from the visualizer's window.
///
/// The mouse is contact id 0; digit keys 1–9 park and lift sticky
/// contacts with ids 1–9, so the full capacity of ten concurrent
/// contacts is reachable with one pointer. The translator tracks which
/// simulated contacts are down so a park toggle knows whether to land
/// or lift.
pub struct SimTouchSource {
    pub rx: Receiver<SimInput>,
}

/// Contact id used for the mouse pointer.
pub const POINTER_ID: ContactId = 0;

impl TouchSource for SimTouchSource {
    fn run(self: Box<Self>, tx: Sender<TouchEvent>) {
        let mut pointer_down = false;
        let mut parked = [false; 10]; // slots 1–9 used

        for input in self.rx {
            let event = match input {
                SimInput::PointerDown { x, y } => {
                    pointer_down = true;
                    TouchEvent::Down { id: POINTER_ID, x, y }
                }
                SimInput::PointerDrag { x, y } => {
                    if !pointer_down {
                        continue;
                    }
                    TouchEvent::Move { id: POINTER_ID, x, y }
                }
                SimInput::PointerUp => {
                    if !pointer_down {
                        continue;
                    }
                    pointer_down = false;
                    TouchEvent::Up { id: POINTER_ID }
                }
                SimInput::ParkToggle { slot, x, y } => {
                    let slot = slot as usize;
                    if !(1..10).contains(&slot) {
                        continue;
                    }
                    if parked[slot] {
                        parked[slot] = false;
                        TouchEvent::Up { id: slot as ContactId }
                    } else {
                        parked[slot] = true;
                        TouchEvent::Down { id: slot as ContactId, x, y }
                    }
                }
                SimInput::ToggleMode => {
                    parked = [false; 10]; // the session aborts; nothing stays down
                    pointer_down = false;
                    TouchEvent::ToggleMode
                }
                SimInput::AdjustTeams { delta } => {
                    parked = [false; 10];
                    pointer_down = false;
                    TouchEvent::AdjustTeams { delta }
                }
                SimInput::Abort => {
                    parked = [false; 10];
                    pointer_down = false;
                    TouchEvent::Abort
                }
                SimInput::Quit => {
                    let _ = tx.send(TouchEvent::Quit);
                    return;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(inputs: Vec<SimInput>) -> Vec<TouchEvent> {
        let (in_tx, in_rx) = mpsc::channel();
        for input in inputs {
            in_tx.send(input).unwrap();
        }
        drop(in_tx);

        let rx = spawn_touch_source(SimTouchSource { rx: in_rx });
        rx.iter().collect()
    }

    #[test]
    fn pointer_drag_becomes_contact_zero() {
        let events = translate(vec![
            SimInput::PointerDown { x: 10.0, y: 20.0 },
            SimInput::PointerDrag { x: 15.0, y: 25.0 },
            SimInput::PointerUp,
        ]);
        assert_eq!(
            events,
            vec![
                TouchEvent::Down { id: 0, x: 10.0, y: 20.0 },
                TouchEvent::Move { id: 0, x: 15.0, y: 25.0 },
                TouchEvent::Up { id: 0 },
            ]
        );
    }

    #[test]
    fn drag_without_button_is_swallowed() {
        let events = translate(vec![
            SimInput::PointerDrag { x: 5.0, y: 5.0 },
            SimInput::PointerUp,
        ]);
        assert!(events.is_empty());
    }

    #[test]
    fn park_toggle_lands_then_lifts() {
        let events = translate(vec![
            SimInput::ParkToggle { slot: 3, x: 100.0, y: 50.0 },
            SimInput::ParkToggle { slot: 3, x: 999.0, y: 999.0 },
        ]);
        assert_eq!(
            events,
            vec![
                TouchEvent::Down { id: 3, x: 100.0, y: 50.0 },
                TouchEvent::Up { id: 3 },
            ]
        );
    }

    #[test]
    fn abort_forgets_parked_contacts() {
        let events = translate(vec![
            SimInput::ParkToggle { slot: 2, x: 0.0, y: 0.0 },
            SimInput::Abort,
            // The slot was forgotten, so this parks again instead of lifting.
            SimInput::ParkToggle { slot: 2, x: 7.0, y: 7.0 },
        ]);
        assert_eq!(
            events,
            vec![
                TouchEvent::Down { id: 2, x: 0.0, y: 0.0 },
                TouchEvent::Abort,
                TouchEvent::Down { id: 2, x: 7.0, y: 7.0 },
            ]
        );
    }

    #[test]
    fn quit_ends_the_source() {
        let events = translate(vec![
            SimInput::Quit,
            SimInput::PointerDown { x: 0.0, y: 0.0 },
        ]);
        assert_eq!(events, vec![TouchEvent::Quit]);
    }
}
