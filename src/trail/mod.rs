//! Whole-canvas operations: stamping particle marks and fading old trails.
//!
//! The canvas is an `Array2<Rgb8>` of dimension `(width, height)`, indexed
//! `[[x, y]]`.

use cgmath::Vector2;
use ndarray::Array2;

mod diffuse;

pub use diffuse::diffuse;

/// One RGB pixel, channels on a 0-255 scale.
pub type Rgb8 = [u8; 3];

pub type Canvas = Array2<Rgb8>;

/// Sets the pixel nearest `position` to `color`.
///
/// Positions produced by `point::advance` stay within the playground, whose
/// inclusive far bound rounds to one past the last pixel; coordinates are
/// clamped into the grid so marks on the bound land on the edge pixel.
pub fn stamp(canvas: &mut Canvas, position: Vector2<f64>, color: Rgb8) {
    let (w, h) = canvas.dim();

    let i = (position.x.max(0.0).round() as usize).min(w - 1);
    let j = (position.y.max(0.0).round() as usize).min(h - 1);

    canvas[[i, j]] = color;
}

/// Subtracts `amount` from every pixel, saturating at zero per channel.
pub fn fade(canvas: &mut Canvas, amount: Rgb8) {
    canvas.map_inplace(|px| {
        for (c, a) in px.iter_mut().zip(&amount) {
            *c = c.saturating_sub(*a);
        }
    });
}
