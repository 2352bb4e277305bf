//! Integer line sampling shared by the targeting services.

use crate::state::Position3;

/// `numerator / denominator` rounded half away from zero. `denominator > 0`.
pub fn round_div(numerator: i64, denominator: i64) -> i64 {
    let twice = 2 * numerator;
    if twice >= 0 {
        (twice + denominator).div_euclid(2 * denominator)
    } else {
        -((-twice + denominator).div_euclid(2 * denominator))
    }
}

/// `numerator / denominator` rounded up. `denominator > 0`.
pub fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    -((-numerator).div_euclid(denominator))
}

/// Cells strictly between `from` and `to` on a discretized 3D line.
///
/// The line takes `max(|dx|, |dy|, |dz|)` steps and rounds each midpoint
/// coordinate to the nearest cell. Samples equal to an endpoint are skipped.
pub fn line_samples(from: Position3, to: Position3) -> Vec<Position3> {
    let dx = i64::from(to.x) - i64::from(from.x);
    let dy = i64::from(to.y) - i64::from(from.y);
    let dz = i64::from(to.z) - i64::from(from.z);
    let steps = dx.abs().max(dy.abs()).max(dz.abs());

    let mut samples = Vec::new();
    for i in 1..steps {
        let cell = Position3::new(
            from.x + round_div(dx * i, steps) as i32,
            from.y + round_div(dy * i, steps) as i32,
            from.z + round_div(dz * i, steps) as i32,
        );
        if cell != from && cell != to && samples.last() != Some(&cell) {
            samples.push(cell);
        }
    }
    samples
}

/// Planar samples strictly between two columns, paired with the line
/// elevation threshold at that sample.
///
/// The threshold is the interpolated elevation rounded up, so a cell at
/// elevation `z` reaches the line iff `z >= threshold`.
pub fn planar_samples(from: Position3, to: Position3) -> Vec<((i32, i32), i32)> {
    let dx = i64::from(to.x) - i64::from(from.x);
    let dy = i64::from(to.y) - i64::from(from.y);
    let dz = i64::from(to.z) - i64::from(from.z);
    let steps = dx.abs().max(dy.abs());

    let mut samples = Vec::new();
    for i in 1..steps {
        let column = (
            from.x + round_div(dx * i, steps) as i32,
            from.y + round_div(dy * i, steps) as i32,
        );
        if column == from.column() || column == to.column() {
            continue;
        }
        let threshold = ceil_div(i64::from(from.z) * steps + dz * i, steps) as i32;
        samples.push((column, threshold));
    }
    samples
}
