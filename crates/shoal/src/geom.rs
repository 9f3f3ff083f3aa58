use crate::rng::XorShift64Star;
use std::f64::consts::PI;

pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Uniform integer-valued point from the disk inscribed in the given box,
/// by rejection sampling.
///
/// Bounds are snapped to integers (mins ceiled, maxes floored) and candidates
/// drawn from the inclusive integer box; a candidate is kept once it falls
/// within `min(width, height) / 2` of the box center. Non-positive spans
/// short-circuit to the center instead of rejecting forever.
pub fn random_point_in_disk(
    rng: &mut XorShift64Star,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) -> (f64, f64) {
    let x_min = x_min.ceil();
    let y_min = y_min.ceil();
    let x_max = x_max.floor();
    let y_max = y_max.floor();

    let center = ((x_min + x_max) / 2.0, (y_min + y_max) / 2.0);
    let width = x_max - x_min;
    let height = y_max - y_min;
    if width <= 0.0 || height <= 0.0 {
        return center;
    }
    let radius = width.min(height) / 2.0;

    loop {
        let x = (rng.next_f64_unit() * (width + 1.0)).floor() + x_min;
        let y = (rng.next_f64_unit() * (height + 1.0)).floor() + y_min;
        if (center.0 - x).hypot(center.1 - y) <= radius {
            return (x, y);
        }
    }
}
