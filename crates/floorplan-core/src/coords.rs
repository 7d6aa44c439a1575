//! Conversions between stored marker coordinates and canvas pixels.
//!
//! Equipment positions are stored normalized to `[0, 1]` of the rendered image,
//! rack positions as percentages in `[0, 100]`. Both are relative to the
//! letterboxed image rectangle computed by [`image_fit_bounds`], not to the
//! container, so they survive container resizes and viewport zoom/pan.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point, Size};

/// Optional snap-to-grid applied before inverse mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGrid {
    pub enabled: bool,
    /// Grid pitch in canvas pixels.
    pub size: f64,
}

impl Default for SnapGrid {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 20.0,
        }
    }
}

impl SnapGrid {
    pub fn snap(&self, p: Point) -> Point {
        if !self.enabled || self.size <= 0.0 {
            return p;
        }
        Point::new(
            (p.x / self.size).round() * self.size,
            (p.y / self.size).round() * self.size,
        )
    }
}

/// Letterbox an image of `image` intrinsic size into `container`.
///
/// Wider-than-container images fit the width and center vertically, the rest
/// fit the height and center horizontally. Without a usable image size the
/// whole container is returned.
pub fn image_fit_bounds(container: Size, image: Option<Size>) -> Bounds {
    let (Some(image_ratio), Some(container_ratio)) = (
        image.and_then(|s| s.aspect_ratio()),
        container.aspect_ratio(),
    ) else {
        return Bounds::from_size(container);
    };

    if image_ratio > container_ratio {
        let height = container.width / image_ratio;
        Bounds::new(0.0, (container.height - height) / 2.0, container.width, height)
    } else {
        let width = container.height * image_ratio;
        Bounds::new((container.width - width) / 2.0, 0.0, width, container.height)
    }
}

/// Normalized `[0, 1]` position to canvas pixels.
pub fn normalized_to_pixel(bounds: &Bounds, x: f64, y: f64) -> Point {
    Point::new(bounds.x + x * bounds.width, bounds.y + y * bounds.height)
}

/// Percentage `[0, 100]` rack position to canvas pixels.
pub fn percent_to_pixel(bounds: &Bounds, x: f64, y: f64) -> Point {
    normalized_to_pixel(bounds, x / 100.0, y / 100.0)
}

/// Canvas pixel to normalized coordinates without snapping or clamping.
///
/// Degenerate bounds map everything to the origin.
pub fn pixel_to_normalized_raw(bounds: &Bounds, pixel: Point) -> Point {
    let nx = if bounds.width > 0.0 {
        (pixel.x - bounds.x) / bounds.width
    } else {
        0.0
    };
    let ny = if bounds.height > 0.0 {
        (pixel.y - bounds.y) / bounds.height
    } else {
        0.0
    };
    Point::new(nx, ny)
}

/// Canvas pixel to a clamped normalized position, used on drag release.
pub fn pixel_to_normalized(bounds: &Bounds, pixel: Point, grid: &SnapGrid) -> Point {
    let raw = pixel_to_normalized_raw(bounds, grid.snap(pixel));
    Point::new(clamp_unit(raw.x), clamp_unit(raw.y))
}

/// Canvas pixel to a clamped percentage position, used on rack drag release.
pub fn pixel_to_percent(bounds: &Bounds, pixel: Point, grid: &SnapGrid) -> Point {
    let n = pixel_to_normalized(bounds, pixel, grid);
    Point::new(n.x * 100.0, n.y * 100.0)
}

/// Whether a raw normalized coordinate lies on the image.
pub fn is_inside(normalized: Point) -> bool {
    (0.0..=1.0).contains(&normalized.x) && (0.0..=1.0).contains(&normalized.y)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
