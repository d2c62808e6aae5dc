//! Angle wrapping and unwrapping.

use std::f64::consts::PI;

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_phase(x: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut w = (x + PI).rem_euclid(two_pi) - PI;
    if w <= -PI {
        w += two_pi;
    }
    w
}

/// Remove `2*PI` discontinuities from a sequence of wrapped angles.
///
/// Whenever consecutive samples jump by more than `PI`, multiples of
/// `2*PI` are added to the remainder of the sequence so it stays continuous.
pub fn unwrap_phase(phases: &[f64]) -> Vec<f64> {
    let two_pi = 2.0 * PI;
    let mut out = Vec::with_capacity(phases.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for &p in phases {
        if let Some(q) = prev {
            let delta = p - q;
            if delta.abs() >= PI {
                let mut wrapped = wrap_phase(delta);
                // A jump of exactly PI keeps its sign.
                if wrapped == PI && delta < 0.0 {
                    wrapped = -PI;
                }
                offset += wrapped - delta;
            }
        }
        out.push(p + offset);
        prev = Some(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_stays_in_range() {
        for x in [-10.0, -PI, -1.0, 0.0, 1.0, PI, 7.5, 100.0] {
            let w = wrap_phase(x);
            assert!(w > -PI - 1e-12 && w <= PI + 1e-12, "{x} -> {w}");
        }
    }

    #[test]
    fn unwrap_restores_linear_ramp() {
        let ramp: Vec<f64> = (0..50).map(|i| i as f64 * 0.4).collect();
        let wrapped: Vec<f64> = ramp.iter().map(|&x| wrap_phase(x)).collect();
        let restored = unwrap_phase(&wrapped);
        for (a, b) in ramp.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn unwrap_empty() {
        assert!(unwrap_phase(&[]).is_empty());
    }
}
