//! Skew detection and correction
//!
//! The skew angle comes from the minimum-area rectangle enclosing every
//! non-zero pixel. Points are taken as (row, column) pairs, and the raw
//! rectangle angle is reported in [-90, 0) degrees before normalization.

use image::{GrayImage, ImageBuffer, Luma};

/// Estimate the rotation (degrees, positive = counter-clockwise) that
/// straightens the foreground. `None` when the image has no foreground.
pub fn estimate_skew(image: &GrayImage) -> Option<f64> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let points = foreground_extremes(image);
    if points.is_empty() {
        return None;
    }

    let hull = convex_hull(points);
    Some(effective_angle(min_area_rect_angle(&hull)))
}

/// Normalize a raw rectangle angle in [-90, 0) into the correcting rotation
pub fn effective_angle(raw: f64) -> f64 {
    if raw < -45.0 {
        -(90.0 + raw)
    } else {
        -raw
    }
}

/// Rotate the image upright when its skew exceeds `min_angle` degrees
pub fn deskew(image: &GrayImage, min_angle: f64) -> GrayImage {
    let Some(angle) = estimate_skew(image) else {
        tracing::debug!("No foreground pixels, skipping deskew");
        return image.clone();
    };

    if angle.abs() <= min_angle {
        tracing::debug!(angle, "Skew below threshold, leaving image as is");
        return image.clone();
    }

    tracing::debug!(angle, "Deskewing page");
    rotate_replicate(image, angle)
}

/// Rotate about the center by `degrees` (counter-clockwise), keeping the
/// canvas size. Pixels rotated in from outside repeat the nearest edge.
pub fn rotate_replicate(image: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;
    let (sin, cos) = degrees.to_radians().sin_cos();

    ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        Luma([sample_bicubic(image, sx, sy)])
    })
}

/// For every row, the leftmost and rightmost non-zero pixel as (row, col).
///
/// The convex hull of these equals the hull of the full foreground set.
fn foreground_extremes(image: &GrayImage) -> Vec<(i64, i64)> {
    let width = image.width() as usize;
    let mut points = Vec::new();

    for (row, pixels) in image.as_raw().chunks(width).enumerate() {
        let first = pixels.iter().position(|&p| p != 0);
        let last = pixels.iter().rposition(|&p| p != 0);
        if let (Some(first), Some(last)) = (first, last) {
            points.push((row as i64, first as i64));
            if last != first {
                points.push((row as i64, last as i64));
            }
        }
    }

    points
}

/// Andrew's monotone chain; returns vertices in counter-clockwise order
fn convex_hull(mut points: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }

    let mut lower: Vec<(i64, i64)> = Vec::new();
    for &p in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<(i64, i64)> = Vec::new();
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Angle in [-90, 0) of the minimum-area rectangle around a convex hull.
///
/// One side of the optimal rectangle is collinear with a hull edge, so only
/// hull edge directions are tried.
fn min_area_rect_angle(hull: &[(i64, i64)]) -> f64 {
    if hull.len() < 2 {
        return -90.0;
    }

    let mut best_area = f64::INFINITY;
    let mut best_direction = 0.0f64;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let (du, dv) = ((b.0 - a.0) as f64, (b.1 - a.1) as f64);
        let length = du.hypot(dv);
        if length == 0.0 {
            continue;
        }
        let (ux, uy) = (du / length, dv / length);

        let (mut min_along, mut max_along) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_across, mut max_across) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(pu, pv) in hull {
            let (pu, pv) = (pu as f64, pv as f64);
            let along = pu * ux + pv * uy;
            let across = -pu * uy + pv * ux;
            min_along = min_along.min(along);
            max_along = max_along.max(along);
            min_across = min_across.min(across);
            max_across = max_across.max(across);
        }

        let area = (max_along - min_along) * (max_across - min_across);
        if area < best_area {
            best_area = area;
            best_direction = dv.atan2(du).to_degrees();
        }
    }

    best_direction.rem_euclid(90.0) - 90.0
}

/// Cubic convolution weights, a = -0.75
fn cubic_weights(t: f64) -> [f64; 4] {
    const A: f64 = -0.75;
    let w0 = ((A * (t + 1.0) - 5.0 * A) * (t + 1.0) + 8.0 * A) * (t + 1.0) - 4.0 * A;
    let w1 = ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0;
    let s = 1.0 - t;
    let w2 = ((A + 2.0) * s - (A + 3.0)) * s * s + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

fn sample_bicubic(image: &GrayImage, sx: f64, sy: f64) -> u8 {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let wx = cubic_weights(sx - x0);
    let wy = cubic_weights(sy - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut value = 0.0;
    for (j, weight_y) in wy.iter().enumerate() {
        let py = (y0 - 1 + j as i64).clamp(0, max_y) as u32;
        for (i, weight_x) in wx.iter().enumerate() {
            let px = (x0 - 1 + i as i64).clamp(0, max_x) as u32;
            value += weight_x * weight_y * image.get_pixel(px, py)[0] as f64;
        }
    }

    value.round().clamp(0.0, 255.0) as u8
}
