//! Circle-detection boundary.
//!
//! The pipeline treats detection as a black box: image in, center
//! estimate or nothing out. [`GridDetector`] is the default estimator —
//! a coarse accumulator over bright pixels followed by a centroid
//! refinement — but anything that finds a single bright disc on a dark
//! background is conformant.

use crate::frame::{Image, Point};

/// A position estimator for a single bright disc on a dark background.
pub trait Detector: Send {
    /// Returns the estimated disc center, or `None` when no plausible
    /// circle is found.
    fn detect(&self, image: &Image) -> Option<Point>;
}

/// Tunable detector knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Accumulator cell size in pixels. Larger values are cheaper and
    /// coarser.
    pub accumulator_scale: u32,
    /// Minimum separation between candidate centers, in accumulator
    /// cells. Also bounds the refinement neighborhood.
    pub min_center_distance: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            accumulator_scale: 6,
            min_center_distance: 8,
        }
    }
}

/// Default detector: grid accumulator + centroid refinement.
pub struct GridDetector {
    config: DetectorConfig,
}

impl GridDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }
}

impl Default for GridDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Pixels at or above this value count as part of the disc.
const BRIGHT_THRESHOLD: u8 = 128;

impl Detector for GridDetector {
    fn detect(&self, image: &Image) -> Option<Point> {
        let scale = self.config.accumulator_scale.max(1);
        let cells_x = image.width().div_ceil(scale).max(1);
        let cells_y = image.height().div_ceil(scale).max(1);

        // Pass 1: bright-pixel count per accumulator cell.
        let mut grid = vec![0u32; cells_x as usize * cells_y as usize];
        let mut total_bright = 0u32;
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.pixel(x, y) >= BRIGHT_THRESHOLD {
                    let cell = (y / scale) * cells_x + (x / scale);
                    grid[cell as usize] += 1;
                    total_bright += 1;
                }
            }
        }

        // Too sparse to be a disc: require at least one full cell's
        // worth of bright pixels.
        if total_bright < scale * scale {
            return None;
        }

        let (best_cell, _) = grid
            .iter()
            .enumerate()
            .max_by_key(|&(_, count)| *count)?;
        let best_cx = (best_cell as u32 % cells_x) * scale + scale / 2;
        let best_cy = (best_cell as u32 / cells_x) * scale + scale / 2;

        // Pass 2: centroid of bright pixels near the winning cell. The
        // neighborhood radius covers min_center_distance cells, so a
        // second disc further away cannot pull the estimate.
        let reach = (self.config.min_center_distance.max(1) * scale) as i64;
        let (mut sum_x, mut sum_y, mut count) = (0i64, 0i64, 0i64);
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.pixel(x, y) < BRIGHT_THRESHOLD {
                    continue;
                }
                let dx = x as i64 - best_cx as i64;
                let dy = y as i64 - best_cy as i64;
                if dx * dx + dy * dy <= reach * reach {
                    sum_x += x as i64;
                    sum_y += y as i64;
                    count += 1;
                }
            }
        }

        if count < (scale * scale) as i64 {
            return None;
        }
        Some(Point::new(
            (sum_x / count) as i32,
            (sum_y / count) as i32,
        ))
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_is_a_miss() {
        let detector = GridDetector::default();
        assert_eq!(detector.detect(&Image::new(100, 100)), None);
    }

    #[test]
    fn centered_disc_is_found() {
        let detector = GridDetector::default();
        let mut img = Image::new(200, 200);
        img.fill_disc(120, 80, 30, 255);
        let p = detector.detect(&img).unwrap();
        assert!((p.x - 120).abs() <= 2, "x estimate {} too far", p.x);
        assert!((p.y - 80).abs() <= 2, "y estimate {} too far", p.y);
    }

    #[test]
    fn partially_clipped_disc_is_still_found() {
        let detector = GridDetector::default();
        let mut img = Image::new(100, 100);
        // ball overshooting the left edge, as the motion source allows
        img.fill_disc(3, 50, 20, 255);
        let p = detector.detect(&img).unwrap();
        assert!((p.y - 50).abs() <= 2);
        assert!(p.x >= 0 && p.x <= 12);
    }

    #[test]
    fn sparse_noise_is_rejected() {
        let detector = GridDetector::default();
        let mut img = Image::new(100, 100);
        for i in 0..10 {
            img.set_pixel(i * 9, i * 7, 255);
        }
        assert_eq!(detector.detect(&img), None);
    }

    #[test]
    fn dim_disc_is_below_threshold() {
        let detector = GridDetector::default();
        let mut img = Image::new(100, 100);
        img.fill_disc(50, 50, 20, 100);
        assert_eq!(detector.detect(&img), None);
    }
}
