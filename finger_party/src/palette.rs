//! The fixed marker palette: ten ARGB colors, each with a friendly name.
//!
//! A contact's `color_index` is `id % 10`, assigned by the core at
//! landing time. Hardware ids that cycle past ten within one session
//! wrap around, so two live contacts can share a color; the game accepts
//! that rather than reassigning slots mid-round.

/// (packed ARGB, friendly name), indexed by `color_index`.
const PALETTE: [(u32, &str); 10] = [
    (0xFFE63946, "red"),
    (0xFFF77F00, "orange"),
    (0xFFFFD166, "gold"),
    (0xFF80B918, "lime"),
    (0xFF2A9D8F, "teal"),
    (0xFF00B4D8, "sky"),
    (0xFF4361EE, "blue"),
    (0xFF9D4EDD, "violet"),
    (0xFFFF70A6, "pink"),
    (0xFFEDEDE9, "white"),
];

/// Marker color for a palette slot. Out-of-range indices wrap, matching
/// the core's `id % PALETTE_SIZE` assignment.
pub fn color(color_index: usize) -> u32 {
    PALETTE[color_index % PALETTE.len()].0
}

/// Friendly name for a palette slot, for the verdict overlay
/// ("the TEAL finger wins").
pub fn name(color_index: usize) -> &'static str {
    PALETTE[color_index % PALETTE.len()].1
}

/// Darken a marker color toward the background. Used for contacts a
/// committed verdict excluded.
pub fn dim(argb: u32, amount: f32) -> u32 {
    let keep = (1.0 - amount.clamp(0.0, 1.0)).max(0.0);
    let scale = |c: u32| ((c as f32) * keep) as u32;
    let r = (argb >> 16) & 0xFF;
    let g = (argb >> 8) & 0xFF;
    let b = argb & 0xFF;
    0xFF000000 | (scale(r) << 16) | (scale(g) << 8) | scale(b)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
