use ndarray::{Array, Zip};

use super::{Canvas, Rgb8};

#[inline]
fn clamp_index(i: usize, delta: isize, len: usize) -> usize {
    let i = i as isize + delta;
    i.max(0).min(len as isize - 1) as usize
}

/// Per channel, the unweighted mean of the 3x3 block centered on `(i, j)`.
///
/// Out-of-grid neighbors are clamped to the nearest edge coordinate, so a
/// corner pixel contributes four of its own nine samples. Channels are summed
/// as integers and divided by 9 with truncation.
fn neighborhood_average(canvas: &Canvas, (i, j): (usize, usize)) -> Rgb8 {
    let (w, h) = canvas.dim();

    let mut sum = [0u32; 3];
    for di in -1..=1 {
        for dj in -1..=1 {
            let px = canvas[[clamp_index(i, di, w), clamp_index(j, dj, h)]];
            for (s, c) in sum.iter_mut().zip(&px) {
                *s += u32::from(*c);
            }
        }
    }

    [(sum[0] / 9) as u8, (sum[1] / 9) as u8, (sum[2] / 9) as u8]
}

/// Blends every pixel with its 3x3 neighborhood average at `rate`:
/// `out = rate * original + (1 - rate) * average`, per channel.
///
/// All averages are taken from the input canvas, never from pixels written
/// during this pass; the result is a freshly allocated canvas. The blend runs
/// in `f64` and truncates back to the 0-255 scale.
pub fn diffuse(canvas: &Canvas, rate: f64) -> Canvas {
    let (w, h) = canvas.dim();

    assert!(w >= 1);
    assert!(h >= 1);
    assert!(rate > 0.0 && rate <= 1.0);

    let mut out = Array::from_elem((w, h), [0u8; 3]);

    Zip::indexed(&mut out).par_for_each(|ij, px| {
        let original = canvas[ij];
        let average = neighborhood_average(canvas, ij);

        for c in 0..3 {
            px[c] = (rate * f64::from(original[c]) + (1.0 - rate) * f64::from(average[c])) as u8;
        }
    });

    out
}
