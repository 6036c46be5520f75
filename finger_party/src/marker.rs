//! Aim-marker and reveal animation state.
//!
//! Pure presentation: tick-driven progress floats advanced once per
//! frame, no wall clock. The session decides what happens; these structs
//! only decide how it looks while happening.

// ════════════════════════════════════════════════════════════════════════════
// AimMarker — the animated circle under one contact
// ════════════════════════════════════════════════════════════════════════════

/// Per-contact marker animation: a spawn-grow pulse and a slowly
/// rotating targeting ring.
#[derive(Clone, Debug)]
pub struct AimMarker {
    /// Spawn progress 0.0–1.0; drives the grow-in scale.
    pub spawn: f32,
    /// Ring rotation in radians, wraps at 2π.
    pub angle: f32,
}

impl AimMarker {
    pub fn new() -> Self {
        AimMarker { spawn: 0.0, angle: 0.0 }
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        if self.spawn < 1.0 {
            self.spawn = (self.spawn + 0.12).min(1.0);
        }
        self.angle += 0.045;
        if self.angle > std::f32::consts::TAU {
            self.angle -= std::f32::consts::TAU;
        }
    }

    /// Current marker scale: overshoots slightly past full size while
    /// spawning, then settles at 1.0.
    pub fn scale(&self) -> f32 {
        if self.spawn >= 1.0 {
            1.0
        } else {
            // Ease-out with a small overshoot around spawn ≈ 0.7.
            let s = self.spawn;
            1.2 * s * (2.0 - s)
        }
    }
}

impl Default for AimMarker {
    fn default() -> Self {
        Self::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RevealPhase — the verdict overlay animation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum RevealPhase {
    /// No verdict on screen.
    Hidden,
    /// The overlay is sweeping in (lock just happened).
    Revealing { progress: f32 },
    /// Fully shown; stays until the session resets.
    Shown,
}

impl RevealPhase {
    pub fn is_visible(&self) -> bool {
        !matches!(self, RevealPhase::Hidden)
    }

    /// Overlay opacity 0.0–1.0 for the current frame.
    pub fn opacity(&self) -> f32 {
        match self {
            RevealPhase::Hidden => 0.0,
            RevealPhase::Revealing { progress } => *progress,
            RevealPhase::Shown => 1.0,
        }
    }

    /// Advance one frame. Returns true when the reveal completes.
    pub fn tick(&mut self) -> bool {
        if let RevealPhase::Revealing { progress } = self {
            *progress += 0.06;
            if *progress >= 1.0 {
                *self = RevealPhase::Shown;
                return true;
            }
        }
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_spawn_settles_at_full_scale() {
        let mut m = AimMarker::new();
        assert!(m.scale() < 0.2);
        for _ in 0..50 {
            m.tick();
        }
        assert_eq!(m.spawn, 1.0);
        assert_eq!(m.scale(), 1.0);
    }

    #[test]
    fn marker_angle_wraps() {
        let mut m = AimMarker::new();
        for _ in 0..500 {
            m.tick();
            assert!(m.angle <= std::f32::consts::TAU + 1e-3);
        }
    }

    #[test]
    fn reveal_completes_to_shown() {
        let mut r = RevealPhase::Revealing { progress: 0.0 };
        let mut done = false;
        for _ in 0..100 {
            if r.tick() {
                done = true;
                break;
            }
        }
        assert!(done);
        assert_eq!(r, RevealPhase::Shown);
        assert_eq!(r.opacity(), 1.0);
    }

    #[test]
    fn hidden_reveal_is_inert() {
        let mut r = RevealPhase::Hidden;
        assert!(!r.tick());
        assert!(!r.is_visible());
        assert_eq!(r.opacity(), 0.0);
    }
}
