//! Per-pixel stain classification and transformation
//!
//! Implements the color heuristic that separates purple/basophilic pixels
//! from bright eosinophilic background: a pixel is basophilic when its red
//! channel passes the gate and its blue channel reaches the red/blue
//! average scaled by the intensity threshold. Basophilic pixels are
//! intensified; bright non-purple pixels are desaturated to grayscale;
//! everything else is left untouched.

use crate::models::{StainProfile, Verdict};

/// Classify one pixel against a stain profile.
///
/// Total over the full u8 domain; no error conditions.
#[inline]
pub fn classify(red: u8, green: u8, blue: u8, profile: &StainProfile) -> Verdict {
    // Blue/red-weighted baseline. Green is deliberately ignored here: it is
    // low in both true purple and true pink, so it does not discriminate.
    let average_purple = (red as u16 + blue as u16) / 2;

    if profile.red_gate.admits(red)
        && blue as f32 >= average_purple as f32 * profile.intensity_threshold
    {
        return Verdict::Basophilic;
    }

    let [red_floor, green_floor, blue_floor] = profile.bright_floor;
    if red >= red_floor && green >= green_floor && blue >= blue_floor {
        Verdict::BrightNonPurple
    } else {
        Verdict::Unclassified
    }
}

/// Classify one RGB pixel and apply the fired branch in place.
///
/// Amplification is computed in f64 and clamped to [0,255] on store;
/// the amplified (pre-clamp) red feeds the blue formula, matching the
/// statement order of the published heuristic. Green is never changed by
/// the basophilic branch.
///
/// Returns the verdict so callers can tally what fired.
#[inline]
pub fn transform_pixel(pixel: &mut [u8], profile: &StainProfile) -> Verdict {
    debug_assert_eq!(pixel.len(), 3, "transform_pixel expects an RGB triple");

    let (red, green, blue) = (pixel[0], pixel[1], pixel[2]);
    let verdict = classify(red, green, blue, profile);

    match verdict {
        Verdict::Basophilic => {
            let new_intensity = profile.new_intensity as f64;
            let new_red = red as f64 * red as f64 * new_intensity;
            let new_blue = blue as f64 * new_red * new_intensity;
            pixel[0] = clamp_channel(new_red);
            pixel[2] = clamp_channel(new_blue);
        }
        Verdict::BrightNonPurple => {
            let average = ((red as u16 + green as u16 + blue as u16) / 3) as u8;
            pixel[0] = average;
            pixel[1] = average;
            pixel[2] = average;
        }
        Verdict::Unclassified => {}
    }

    verdict
}

/// Clamp a wide intermediate back into the u8 channel range.
/// Fractional values truncate, consistent with the rule's floor divisions.
#[inline]
fn clamp_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
