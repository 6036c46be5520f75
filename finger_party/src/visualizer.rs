//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │  [aim markers under every finger]                     │
//! │     (countdown arcs while the hold window runs)       │
//! │                                                       │
//! │  [winner ring / team gradient lines after the lock]   │
//! │  [verdict overlay text]                               │
//! │  status bar                                           │
//! │  key legend                                           │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The visualizer owns the window and the raw-input side of the
//! simulation: each frame it polls the mouse and keyboard and forwards
//! [`SimInput`] events to the touch-source translator.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use touch_session::{Contact, ContactId, Phase, Verdict};

use crate::marker::{AimMarker, RevealPhase};
use crate::palette;
use crate::touch_source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 600;
const STATUS_Y: usize = WIN_H - 40;
const MARKER_R: f32 = 34.0;
const BG_COLOR: u32 = 0xFF1A1A2E;
const TEXT_BG: u32 = 0xFF0F3460;
const ARC_COLOR: u32 = 0xFFFFD700; // gold countdown
const WINNER_RING: u32 = 0xFFFFFFFF;

// ════════════════════════════════════════════════════════════════════════════
// Scene — everything one frame needs, assembled by the app
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene<'a> {
    pub phase: Phase,
    pub contacts: &'a [Contact],
    /// Marker animation keyed by contact id; same ids as `contacts`.
    pub markers: &'a BTreeMap<ContactId, AimMarker>,
    pub verdict: Option<&'a Verdict>,
    pub reveal: &'a RevealPhase,
    /// Fraction of the hold window consumed, while open.
    pub lock_progress: Option<f32>,
    /// Big overlay line shown with the verdict.
    pub announcement: &'a str,
    pub status: &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,
    pointer_was_down: bool,
    last_pointer: (f32, f32),
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Finger Party — who's it gonna be?",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            pointer_was_down: false,
            last_pointer: (0.0, 0.0),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll mouse and keyboard, translate to [`SimInput`] events.
    /// Returns false when the app should quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }
        if one_shot(&self.window, Key::M) {
            let _ = self.sim_tx.send(SimInput::ToggleMode);
        }
        if one_shot(&self.window, Key::Up) {
            let _ = self.sim_tx.send(SimInput::AdjustTeams { delta: 1 });
        }
        if one_shot(&self.window, Key::Down) {
            let _ = self.sim_tx.send(SimInput::AdjustTeams { delta: -1 });
        }
        if one_shot(&self.window, Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Abort);
        }

        // ── pointer: contact 0 ────────────────────────────────────────────
        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            self.last_pointer = (x, y);
        }
        let (x, y) = self.last_pointer;
        let down = self.window.get_mouse_down(MouseButton::Left);
        match (self.pointer_was_down, down) {
            (false, true) => {
                let _ = self.sim_tx.send(SimInput::PointerDown { x, y });
            }
            (true, true) => {
                let _ = self.sim_tx.send(SimInput::PointerDrag { x, y });
            }
            (true, false) => {
                let _ = self.sim_tx.send(SimInput::PointerUp);
            }
            (false, false) => {}
        }
        self.pointer_was_down = down;

        // ── digit keys: parked contacts 1–9 at the cursor ─────────────────
        const DIGITS: [Key; 9] = [
            Key::Key1,
            Key::Key2,
            Key::Key3,
            Key::Key4,
            Key::Key5,
            Key::Key6,
            Key::Key7,
            Key::Key8,
            Key::Key9,
        ];
        for (i, &key) in DIGITS.iter().enumerate() {
            if one_shot(&self.window, key) {
                let _ = self.sim_tx.send(SimInput::ParkToggle {
                    slot: (i + 1) as u8,
                    x,
                    y,
                });
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene) {
        self.buf.fill(BG_COLOR);

        // ── team gradient lines go under the markers ──────────────────────
        if let Some(Verdict::Teams { teams }) = scene.verdict {
            self.draw_team_lines(teams, scene.contacts, scene.reveal.opacity());
        }

        // ── aim markers ───────────────────────────────────────────────────
        for contact in scene.contacts {
            let marker = scene.markers.get(&contact.id);
            self.draw_marker(contact, marker, scene);
        }

        // ── verdict overlay text ──────────────────────────────────────────
        if scene.reveal.is_visible() && !scene.announcement.is_empty() {
            let opacity = scene.reveal.opacity();
            let color = blend(BG_COLOR, 0xFFFFFFFF, opacity);
            let scale = 3usize;
            let w = text_width(scene.announcement, scale);
            let x = (WIN_W.saturating_sub(w)) / 2;
            self.draw_text(scene.announcement, x, 40, scale, color);
        }

        // ── idle hint ─────────────────────────────────────────────────────
        if scene.phase == Phase::Idle {
            let hint = "put your fingers down";
            let scale = 2usize;
            let w = text_width(hint, scale);
            self.draw_text(hint, (WIN_W - w) / 2, WIN_H / 2 - 5, scale, 0xFF556688);
        }

        // ── status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_text(scene.status, 10, STATUS_Y + 6, 2, 0xFFEEEEEE);

        // ── key legend ────────────────────────────────────────────────────
        self.draw_text(
            "mouse=finger 0  1-9=park finger  m=mode  up/down=teams  esc=abort  q=quit",
            10,
            WIN_H - 12,
            1,
            0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── markers ───────────────────────────────────────────────────────────

    fn draw_marker(&mut self, contact: &Contact, marker: Option<&AimMarker>, scene: &Scene) {
        let base = palette::color(contact.color_index);
        let locked = scene.phase == Phase::Locked;
        let is_winner = matches!(scene.verdict, Some(Verdict::Winner { id }) if *id == contact.id);

        let color = if locked && !contact.active {
            palette::dim(base, 0.65 * scene.reveal.opacity())
        } else {
            base
        };

        let (scale, angle) = marker
            .map(|m| (m.scale(), m.angle))
            .unwrap_or((1.0, 0.0));
        let r = MARKER_R * scale;
        let (cx, cy) = (contact.x, contact.y);

        self.fill_circle(cx, cy, r * 0.55, color);
        self.draw_ring(cx, cy, r, 3.0, color);

        // Rotating crosshair ticks on the ring.
        for i in 0..4 {
            let a = angle + i as f32 * std::f32::consts::FRAC_PI_2;
            let (tx, ty) = (cx + a.cos() * r, cy + a.sin() * r);
            self.fill_circle(tx, ty, 3.0, color);
        }

        // Countdown arc while the hold window runs.
        if let Some(progress) = scene.lock_progress {
            self.draw_arc(cx, cy, r + 8.0, 3.0, progress, ARC_COLOR);
        }

        // The winner gets a bright outer ring that grows with the reveal.
        if is_winner {
            let grow = 10.0 + 14.0 * scene.reveal.opacity();
            self.draw_ring(cx, cy, r + grow, 4.0, WINNER_RING);
        }
    }

    // ── team lines ────────────────────────────────────────────────────────

    /// Connect each team's members in assignment order with lines that
    /// fade from one member's color to the next.
    fn draw_team_lines(&mut self, teams: &[Vec<ContactId>], contacts: &[Contact], opacity: f32) {
        let find = |id: ContactId| contacts.iter().find(|c| c.id == id);
        for team in teams {
            for pair in team.windows(2) {
                if let (Some(a), Some(b)) = (find(pair[0]), find(pair[1])) {
                    let ca = blend(BG_COLOR, palette::color(a.color_index), opacity);
                    let cb = blend(BG_COLOR, palette::color(b.color_index), opacity);
                    self.gradient_line(a.x, a.y, b.x, b.y, ca, cb, 3);
                }
            }
        }
    }

    // ── primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let r2 = r * r;
        let (x0, x1) = ((cx - r) as isize, (cx + r) as isize + 1);
        let (y0, y1) = ((cy - r) as isize, (cy + r) as isize + 1);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, color: u32) {
        let outer = r + thickness / 2.0;
        let inner = (r - thickness / 2.0).max(0.0);
        let (o2, i2) = (outer * outer, inner * inner);
        let (x0, x1) = ((cx - outer) as isize, (cx + outer) as isize + 1);
        let (y0, y1) = ((cy - outer) as isize, (cy + outer) as isize + 1);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 <= o2 && d2 >= i2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Partial ring from twelve o'clock, clockwise, `fraction` of a full
    /// turn.
    fn draw_arc(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, fraction: f32, color: u32) {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction <= 0.0 {
            return;
        }
        let sweep = fraction * std::f32::consts::TAU;
        let outer = r + thickness / 2.0;
        let inner = (r - thickness / 2.0).max(0.0);
        let (o2, i2) = (outer * outer, inner * inner);
        let (x0, x1) = ((cx - outer) as isize, (cx + outer) as isize + 1);
        let (y0, y1) = ((cy - outer) as isize, (cy + outer) as isize + 1);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 > o2 || d2 < i2 {
                    continue;
                }
                // Angle measured clockwise from twelve o'clock.
                let mut a = dx.atan2(-dy);
                if a < 0.0 {
                    a += std::f32::consts::TAU;
                }
                if a <= sweep {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Thick line whose color fades from `c0` at one end to `c1` at the
    /// other.
    fn gradient_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, c0: u32, c1: u32, half: isize) {
        let steps = ((x1 - x0).abs().max((y1 - y0).abs()) as usize).max(1);
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = (x0 + (x1 - x0) * t) as isize;
            let y = (y0 + (y1 - y0) * t) as isize;
            let c = blend(c0, c1, t);
            for dy in -half..=half {
                for dx in -half..=half {
                    self.set_pixel(x + dx, y + dy, c);
                }
            }
        }
    }

    /// 3×5 bitmap font with integer scaling.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

/// Pixel width of a string at a given font scale.
pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
