//! Piecewise-linear interpolation over monotone sample positions.

/// Interpolate `ys` sampled at ascending `xs` onto the point `x`.
///
/// Values outside `[xs[0], xs[n-1]]` hold the nearest boundary sample.
/// Returns NaN when there are no samples.
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First index with xs[i] > x; guaranteed to be in 1..n by the checks above.
    let hi = xs[..n].partition_point(|&v| v <= x);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span <= 0.0 {
        return ys[hi];
    }
    let w = (x - xs[lo]) / span;
    ys[lo] + w * (ys[hi] - ys[lo])
}

/// Interpolate a series with gaps onto `grid`.
///
/// Samples whose value is NaN are ignored, so each grid point is weighted
/// between the nearest *present* neighbours. A series with no present
/// values yields NaN everywhere.
pub fn interp_onto(xs: &[f64], ys: &[f64], grid: &[f64]) -> Vec<f64> {
    let (px, py): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter(|(_, y)| !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .unzip();
    grid.iter().map(|&g| interp_linear(&px, &py, g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_between_neighbours() {
        let xs = [0.0, 10.0, 30.0];
        let ys = [0.0, 1.0, 3.0];
        assert!((interp_linear(&xs, &ys, 5.0) - 0.5).abs() < 1e-12);
        assert!((interp_linear(&xs, &ys, 20.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn exact_sample_positions_are_reproduced() {
        let xs = [0.0, 20.0, 40.0];
        let ys = [1.5, -2.0, 7.0];
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_eq!(interp_linear(&xs, &ys, *x), *y);
        }
    }

    #[test]
    fn boundaries_hold_their_value() {
        let xs = [10.0, 20.0];
        let ys = [4.0, 8.0];
        assert_eq!(interp_linear(&xs, &ys, -100.0), 4.0);
        assert_eq!(interp_linear(&xs, &ys, 100.0), 8.0);
    }

    #[test]
    fn empty_input_is_nan() {
        assert!(interp_linear(&[], &[], 1.0).is_nan());
    }

    #[test]
    fn gaps_are_bridged() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, f64::NAN, 2.0];
        let out = interp_onto(&xs, &ys, &[0.5, 1.0]);
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn all_missing_yields_nan() {
        let out = interp_onto(&[0.0, 1.0], &[f64::NAN, f64::NAN], &[0.5]);
        assert!(out[0].is_nan());
    }
}
