//! Image processing pipeline
//!
//! Applies the stain classifier across an entire decoded image, either
//! mutating it in place (highlight mode) or reporting a pixel census
//! (counting mode).

use crate::classifier::transform_pixel;
use crate::decoders::DecodedImage;
use crate::models::{HighlightOptions, Verdict};
use crate::parallel;

/// Verdict tallies from a highlight run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightStats {
    /// Pixels intensified by the basophilic branch.
    pub basophilic: u64,

    /// Pixels desaturated to grayscale.
    pub bright_non_purple: u64,

    /// Pixels returned unchanged.
    pub unclassified: u64,
}

impl HighlightStats {
    fn tally(mut self, verdict: Verdict) -> Self {
        match verdict {
            Verdict::Basophilic => self.basophilic += 1,
            Verdict::BrightNonPurple => self.bright_non_purple += 1,
            Verdict::Unclassified => self.unclassified += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            basophilic: self.basophilic + other.basophilic,
            bright_non_purple: self.bright_non_purple + other.bright_non_purple,
            unclassified: self.unclassified + other.unclassified,
        }
    }

    /// Total pixels classified.
    pub fn total(&self) -> u64 {
        self.basophilic + self.bright_non_purple + self.unclassified
    }
}

/// Apply the classifier to every pixel of the image in place.
///
/// Pixels are classified independently, so iteration order has no
/// observable effect; raster order is kept for reproducibility, and large
/// images are partitioned across workers each owning a disjoint chunk.
pub fn highlight_image(
    image: &mut DecodedImage,
    options: &HighlightOptions,
) -> Result<HighlightStats, String> {
    if image.channels != 3 {
        return Err(format!(
            "Highlighting requires 3-channel RGB, got {} channels",
            image.channels
        ));
    }

    let expected_len = (image.width as usize) * (image.height as usize) * 3;
    if image.data.len() != expected_len {
        return Err(format!(
            "Image buffer size mismatch: expected {}, got {}",
            expected_len,
            image.data.len()
        ));
    }

    let profile = options.profile;
    let stats = parallel::fold_chunks_mut(
        &mut image.data,
        3,
        HighlightStats::default,
        |acc: HighlightStats, pixel: &mut [u8]| acc.tally(transform_pixel(pixel, &profile)),
        HighlightStats::merge,
    );

    if options.debug {
        eprintln!(
            "[DEBUG] Verdicts - basophilic: {}, bright: {}, unchanged: {} (total {})",
            stats.basophilic,
            stats.bright_non_purple,
            stats.unclassified,
            stats.total()
        );
    }

    Ok(stats)
}

/// Count the pixels of an image.
///
/// The counting walk of the source program was a pixel census: it visited
/// every pixel and incremented once per pixel, while also running a second
/// classification pass whose writes were always discarded. The only
/// observable output was `width * height`, so the census is computed
/// directly; the discarded threshold set survives as
/// [`crate::models::StainProfile::counting`].
pub fn count_pixels(image: &DecodedImage) -> u64 {
    image.width as u64 * image.height as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StainProfile;

    fn test_image(width: u32, height: u32, fill: [u8; 3]) -> DecodedImage {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&fill);
        }
        DecodedImage {
            width,
            height,
            data,
            channels: 3,
        }
    }

    #[test]
    fn test_highlight_mixed_image() {
        // 2x2 raster: basophilic, bright-non-purple, unclassified, basophilic.
        let mut image = DecodedImage {
            width: 2,
            height: 2,
            data: vec![
                200, 60, 210, // amplified, clamps to 255
                120, 95, 115, // grayscale to 110
                100, 40, 20, // untouched
                2, 7, 3, // amplified within range
            ],
            channels: 3,
        };

        let stats = highlight_image(&mut image, &HighlightOptions::default()).unwrap();

        assert_eq!(stats.basophilic, 2);
        assert_eq!(stats.bright_non_purple, 1);
        assert_eq!(stats.unclassified, 1);
        assert_eq!(
            image.data,
            vec![255, 60, 255, 110, 110, 110, 100, 40, 20, 4, 7, 17]
        );
    }

    #[test]
    fn test_highlight_rejects_non_rgb() {
        let mut image = DecodedImage {
            width: 2,
            height: 2,
            data: vec![0; 16],
            channels: 4,
        };

        let result = highlight_image(&mut image, &HighlightOptions::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("3-channel RGB"));
    }

    #[test]
    fn test_highlight_rejects_truncated_buffer() {
        let mut image = DecodedImage {
            width: 4,
            height: 4,
            data: vec![0; 9], // should be 48
            channels: 3,
        };

        let result = highlight_image(&mut image, &HighlightOptions::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("size mismatch"));
    }

    #[test]
    fn test_highlight_large_image_parallel_path() {
        // Above PARALLEL_THRESHOLD pixels; every pixel takes the grayscale
        // branch under a raised purple bar.
        let mut image = test_image(200, 160, [120, 95, 115]);
        let options = HighlightOptions {
            profile: StainProfile {
                intensity_threshold: 2.0,
                ..StainProfile::highlight()
            },
            debug: false,
        };

        let stats = highlight_image(&mut image, &options).unwrap();

        assert_eq!(stats.bright_non_purple, 200 * 160);
        assert_eq!(stats.total(), 200 * 160);
        assert!(image.data.chunks_exact(3).all(|px| px == [110, 110, 110]));
    }

    #[test]
    fn test_stats_total_matches_pixel_count() {
        let mut image = test_image(13, 7, [33, 44, 55]);
        let stats = highlight_image(&mut image, &HighlightOptions::default()).unwrap();
        assert_eq!(stats.total(), count_pixels(&image));
    }

    #[test]
    fn test_count_pixels_is_a_census() {
        // 3x4 image, arbitrary content: exactly 12.
        let image = test_image(3, 4, [200, 60, 210]);
        assert_eq!(count_pixels(&image), 12);

        // Content never changes the count.
        let dark = test_image(3, 4, [0, 0, 0]);
        assert_eq!(count_pixels(&dark), 12);
    }
}
