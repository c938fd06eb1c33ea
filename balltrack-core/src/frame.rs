//! Frame and geometry value types shared across the pipeline.

use serde::{Deserialize, Serialize};

// ── Point ────────────────────────────────────────────────────────

/// A pixel position. The origin is the top-left corner; y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in pixel units.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Image ────────────────────────────────────────────────────────

/// An 8-bit grayscale raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Create a black image of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel value at (x, y), or 0 when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set a pixel. Out-of-bounds writes are ignored, so shapes may be
    /// drawn partially off-screen (the ball overshoots its bounds by up
    /// to one velocity step before reflecting).
    pub fn set_pixel(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Draw a filled disc of `radius` centered at (cx, cy).
    pub fn fill_disc(&mut self, cx: i32, cy: i32, radius: i32, value: u8) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(cx + dx, cy + dy, value);
                }
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// ── FramePacket ──────────────────────────────────────────────────

/// One frame of media: a pixel buffer plus its monotonic tick.
///
/// Immutable once created; ownership transfers from the producer to
/// whichever consumer ends up holding it (queue entry, worker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePacket {
    pub image: Image,
    pub timestamp: i64,
}

impl FramePacket {
    pub fn new(image: Image, timestamp: i64) -> Self {
        Self { image, timestamp }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn new_image_is_black() {
        let img = Image::new(8, 4);
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 4);
        assert!(img.as_bytes().iter().all(|&p| p == 0));
    }

    #[test]
    fn fill_disc_sets_center_and_skips_corners() {
        let mut img = Image::new(20, 20);
        img.fill_disc(10, 10, 4, 255);
        assert_eq!(img.pixel(10, 10), 255);
        assert_eq!(img.pixel(10, 14), 255);
        assert_eq!(img.pixel(0, 0), 0);
        // corner of the bounding box lies outside the disc
        assert_eq!(img.pixel(14, 14), 0);
    }

    #[test]
    fn off_screen_draw_is_clipped() {
        let mut img = Image::new(10, 10);
        img.fill_disc(0, 0, 3, 255);
        assert_eq!(img.pixel(0, 0), 255);
        // no panic and nothing wrapped around
        assert_eq!(img.pixel(9, 9), 0);
    }

    #[test]
    fn out_of_bounds_pixel_reads_zero() {
        let img = Image::new(4, 4);
        assert_eq!(img.pixel(100, 100), 0);
    }
}
