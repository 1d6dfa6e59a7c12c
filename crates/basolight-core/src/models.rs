//! Data models for Basolight
//!
//! Core data structures for stain profiles, classification verdicts, and
//! highlighting options.

use serde::{Deserialize, Serialize};

/// Classification outcome for a single pixel.
///
/// Recomputed per pixel, per call; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Purple-toned pixel belonging to a basophilic structure; intensified.
    Basophilic,

    /// Bright in all channels but not purple; desaturated to grayscale.
    BrightNonPurple,

    /// Neither condition holds; returned unchanged.
    Unclassified,
}

/// Red-channel gate for the basophilic branch.
///
/// The published heuristic only requires red to be *nonzero*, not
/// sufficiently large, even though the domain description says
/// "sufficiently red and blue". `NonZero` preserves that behavior
/// literally; `Floor` exposes the magnitude-comparison variant so both
/// can be evaluated side by side without duplicating the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum RedGate {
    /// Red passes whenever it is nonzero (source behavior).
    NonZero,

    /// Red passes only when at or above the given floor.
    Floor(u8),
}

impl Default for RedGate {
    fn default() -> Self {
        Self::NonZero
    }
}

impl RedGate {
    /// Whether the given red channel value passes this gate.
    #[inline]
    pub fn admits(&self, red: u8) -> bool {
        match self {
            Self::NonZero => red != 0,
            Self::Floor(floor) => red >= *floor,
        }
    }
}

/// Parameterized classification rule for one staining context.
///
/// The highlight and counting passes of the source program carried two
/// near-duplicate rules with different magic numbers. Factoring the rule
/// into a profile makes the divergence explicit: the same code runs with
/// either threshold set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StainProfile {
    /// Scales the purple-qualification bar: the basophilic branch requires
    /// `blue >= average_purple * intensity_threshold`.
    pub intensity_threshold: f32,

    /// Amplification factor for the basophilic branch.
    pub new_intensity: f32,

    /// Per-channel floors (R, G, B) for the bright-non-purple branch.
    pub bright_floor: [u8; 3],

    /// Red-channel gate for the basophilic branch.
    pub red_gate: RedGate,
}

impl StainProfile {
    /// Threshold set used when highlighting (the published defaults).
    pub fn highlight() -> Self {
        Self {
            intensity_threshold: 1.0,
            new_intensity: 1.2,
            bright_floor: [110, 90, 110],
            red_gate: RedGate::NonZero,
        }
    }

    /// Threshold set the source program used inside its counting walk:
    /// lower bright floors and no multiplier on the purple bar.
    ///
    /// The counting walk's channel writes were always discarded, so this
    /// profile has no effect on any returned count; it is kept so the
    /// divergence between the two published threshold sets stays visible
    /// and testable.
    pub fn counting() -> Self {
        Self {
            intensity_threshold: 1.0,
            new_intensity: 1.2,
            bright_floor: [100, 80, 100],
            red_gate: RedGate::NonZero,
        }
    }
}

impl Default for StainProfile {
    fn default() -> Self {
        Self::highlight()
    }
}

/// Options controlling a highlight run.
#[derive(Debug, Clone, Default)]
pub struct HighlightOptions {
    /// Classification rule to apply.
    pub profile: StainProfile,

    /// Enable debug output showing verdict statistics.
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_gate_non_zero() {
        let gate = RedGate::NonZero;
        assert!(!gate.admits(0));
        assert!(gate.admits(1));
        assert!(gate.admits(255));
    }

    #[test]
    fn test_red_gate_floor() {
        let gate = RedGate::Floor(50);
        assert!(!gate.admits(0));
        assert!(!gate.admits(49));
        assert!(gate.admits(50));
        assert!(gate.admits(255));
    }

    #[test]
    fn test_profile_defaults_match_highlight_set() {
        let profile = StainProfile::default();
        assert!((profile.intensity_threshold - 1.0).abs() < f32::EPSILON);
        assert!((profile.new_intensity - 1.2).abs() < f32::EPSILON);
        assert_eq!(profile.bright_floor, [110, 90, 110]);
        assert_eq!(profile.red_gate, RedGate::NonZero);
    }

    #[test]
    fn test_counting_profile_uses_lower_floors() {
        let profile = StainProfile::counting();
        assert_eq!(profile.bright_floor, [100, 80, 100]);
    }
}
