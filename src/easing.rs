//! Quadratic ease-in-out, in the classic Penner `(t, b, c, d)` shape.

/// Interpolate between `b` and `b + c` over a duration `d`.
///
/// `t` is clamped to `[0, d]`, so a frame delivered after the deadline lands
/// exactly on `b + c`. A non-positive duration yields the end value.
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if d <= 0.0 || t >= d {
        return b + c;
    }
    if t <= 0.0 {
        return b;
    }

    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    let t = t - 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}
