use crate::error::{RenderError, Result};
use glam::DVec2;

/// Axis-aligned box in pixel space. Pixel space is centred on the screen with y pointing up,
/// so `top` is numerically larger than `bottom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build from the top-left and bottom-right corners.
    pub fn from_corners(top_left: (f64, f64), bottom_right: (f64, f64)) -> Self {
        Self::new(
            top_left.0,
            top_left.1,
            bottom_right.0 - top_left.0,
            top_left.1 - bottom_right.1,
        )
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top - self.height
    }

    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom()) / 2.
    }

    pub fn top_left(&self) -> DVec2 {
        DVec2::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> DVec2 {
        DVec2::new(self.right(), self.bottom())
    }

    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0. || self.height <= 0. {
            return Err(RenderError::config(format!(
                "{name} viewport has no area ({} x {})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Map a fractional grid position into `viewport`, which shows a grid of `dims` (rows, cols).
/// Rows grow downward on screen, so y decreases as `row` increases.
pub fn grid_to_pixel(viewport: &Viewport, dims: (usize, usize), row: f64, col: f64) -> DVec2 {
    let cell_width = viewport.width / dims.1 as f64;
    let cell_height = viewport.height / dims.0 as f64;
    DVec2::new(
        viewport.left + col * cell_width,
        viewport.top - row * cell_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: Viewport = Viewport::new(-380., 130., 370., 280.);

    #[test]
    fn corners_roundtrip() {
        let vp = Viewport::from_corners((-380., 130.), (-10., -150.));
        assert_eq!(vp, MAP);
        assert_eq!(vp.bottom_right(), DVec2::new(-10., -150.));
        assert_eq!(vp.center_y(), -10.);
    }

    #[test]
    fn grid_origin_and_far_corner() {
        assert_eq!(grid_to_pixel(&MAP, (5, 6), 0., 0.), DVec2::new(-380., 130.));
        let far = grid_to_pixel(&MAP, (5, 6), 5., 6.);
        assert!((far.x - -10.).abs() < 1e-9);
        assert!((far.y - -150.).abs() < 1e-9);
    }

    #[test]
    fn rows_go_down() {
        let a = grid_to_pixel(&MAP, (5, 6), 1., 2.5);
        let b = grid_to_pixel(&MAP, (5, 6), 2., 2.5);
        assert_eq!(a.x, b.x);
        assert!((a.y - b.y - 56.).abs() < 1e-9);
    }

    #[test]
    fn zero_size_is_invalid() {
        assert!(Viewport::new(0., 0., 0., 10.).validate("view").is_err());
        assert!(Viewport::new(0., 0., 10., -1.).validate("view").is_err());
        assert!(MAP.validate("map").is_ok());
    }
}
