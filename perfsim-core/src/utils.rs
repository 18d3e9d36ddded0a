//! Module containing miscellaneous utility functions.

use crate::imports::*;

/// Element-wise difference with a leading zero, so the result has the same length as `x`
pub fn diff(x: &Array1<f64>) -> Array1<f64> {
    let mut out = Array1::zeros(x.len());
    for i in 1..x.len() {
        out[i] = x[i] - x[i - 1];
    }
    out
}

/// return max of 2 f64
pub fn max(a: f64, b: f64) -> f64 {
    a.max(b)
}

/// return min of 2 f64
pub fn min(a: f64, b: f64) -> f64 {
    a.min(b)
}

/// interpolation algorithm from <http://www.cplusplus.com/forum/general/216928/>
/// Arguments:
/// x : value at which to interpolate
/// x_data : sorted x values, at least two
/// y_data : y values, same length as `x_data`
/// extrapolate : if false, holds the end values outside of `x_data`
///
/// Callers validate `x_data` and `y_data` up front (see [`crate::vehicle::Vehicle::set_derived`]).
pub fn interpolate(x: f64, x_data: &[f64], y_data: &[f64], extrapolate: bool) -> f64 {
    debug_assert!(x_data.len() == y_data.len() && x_data.len() >= 2);
    let size = x_data.len();

    let mut i = 0;
    if x >= x_data[size - 2] {
        i = size - 2;
    } else {
        while x > x_data[i + 1] {
            i += 1;
        }
    }
    let xl = x_data[i];
    let mut yl = y_data[i];
    let xr = x_data[i + 1];
    let mut yr = y_data[i + 1];
    if !extrapolate {
        if x < xl {
            yr = yl;
        }
        if x > xr {
            yl = yr;
        }
    }
    let dydx = (yr - yl) / (xr - xl);
    yl + dydx * (x - xl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff() {
        assert_eq!(diff(&Array1::range(0.0, 3.0, 1.0)), array![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_that_interpolation_works() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 10.0, 20.0, 30.0, 40.0];
        let y = interpolate(3.0, &xs, &ys, false);
        assert_eq!(y, 30.0);
        let y = interpolate(2.5, &xs, &ys, false);
        assert_eq!(y, 25.0);
    }

    #[test]
    fn test_interpolate_holds_ends_without_extrapolation() {
        let xs = [0.0, 1.0];
        let ys = [0.5, 0.9];
        assert_eq!(interpolate(-1.0, &xs, &ys, false), 0.5);
        assert_eq!(interpolate(2.0, &xs, &ys, false), 0.9);
        assert!(interpolate(2.0, &xs, &ys, true).approx_eq(&1.3, 1e-12));
    }
}
