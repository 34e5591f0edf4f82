//! Rotation by angles that are not a multiple of 90 degrees.
//!
//! Right-angle turns are exact pixel permutations handled by the `image`
//! crate. Anything else is inverse mapped: every pixel of the enlarged
//! canvas looks up its source position and blends the four neighbours.
//!
//! For a counter-clockwise turn by θ with the y axis pointing down:
//! ```text
//! src = R(θ) · (dst - dst_center) + src_center
//! R(θ) = | cos θ  -sin θ |
//!        | sin θ   cos θ |
//! ```
//! Canvas pixels that land outside the source stay fully transparent.

use image::{Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Size of the canvas that holds a `width` x `height` bitmap turned by
/// `angle_degrees`.
pub(crate) fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (f64::from(width), f64::from(height));

    // Snap so right angles don't pick up a pixel from float noise.
    let edge = |extent: f64| ((extent * 1e6).round() / 1e6).round().max(1.0) as u32;
    (edge(w * cos + h * sin), edge(w * sin + h * cos))
}

/// Rotate counter-clockwise by `angle_degrees` onto an enlarged canvas.
pub(crate) fn rotate_expanded(image: &RgbaImage, angle_degrees: f64) -> RgbaImage {
    let (width, height) = compute_rotated_bounds(image.width(), image.height(), angle_degrees);
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    let source_center = (f64::from(image.width()) / 2.0, f64::from(image.height()) / 2.0);
    let canvas_center = (f64::from(width) / 2.0, f64::from(height) / 2.0);

    RgbaImage::from_fn(width, height, |x, y| {
        let dx = f64::from(x) + 0.5 - canvas_center.0;
        let dy = f64::from(y) + 0.5 - canvas_center.1;

        // Back to pixel-index space, where pixel i covers [i, i + 1).
        let sx = cos * dx - sin * dy + source_center.0 - 0.5;
        let sy = sin * dx + cos * dy + source_center.1 - 0.5;
        blend_neighbours(image, sx, sy)
    })
}

fn blend_neighbours(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = f64::from(image.width()) - 1.0;
    let max_y = f64::from(image.height()) - 1.0;
    if x < -0.5 || y < -0.5 || x > max_x + 0.5 || y > max_y + 0.5 {
        return TRANSPARENT;
    }

    let (x, y) = (x.clamp(0.0, max_x), y.clamp(0.0, max_y));
    let (left, top) = (x.floor() as u32, y.floor() as u32);
    let right = (left + 1).min(image.width() - 1);
    let bottom = (top + 1).min(image.height() - 1);
    let (tx, ty) = (x - f64::from(left), y - f64::from(top));

    let corners = [
        (image.get_pixel(left, top), (1.0 - tx) * (1.0 - ty)),
        (image.get_pixel(right, top), tx * (1.0 - ty)),
        (image.get_pixel(left, bottom), (1.0 - tx) * ty),
        (image.get_pixel(right, bottom), tx * ty),
    ];

    let mut blended = [0.0f64; 4];
    for (pixel, weight) in corners {
        for (acc, &channel) in blended.iter_mut().zip(pixel.0.iter()) {
            *acc += f64::from(channel) * weight;
        }
    }
    Rgba(blended.map(|v| v.round().clamp(0.0, 255.0) as u8))
}
