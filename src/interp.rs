//! Linear and bilinear interpolation over the reference dataset grid.
//!
//! Queries outside the grid are resolved by an explicit [`Extrapolation`] policy: either
//! an [`LutError::OutOfRange`] error or evaluation at the nearest grid edge. Values that
//! land exactly on a grid node reproduce the stored value bit for bit.

use crate::config::Extrapolation;
use crate::error::LutError;

/// Position of a target value on an axis: the two bracketing nodes and the weight of `hi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: usize,
    pub hi: usize,
    pub weight: f64,
}

impl Bracket {
    pub fn blend(&self, values: &[f64]) -> f64 {
        lerp(values[self.lo], values[self.hi], self.weight)
    }
}

// Written as a weighted sum so that weight 0 and weight 1 return the nodes exactly.
fn lerp(lo: f64, hi: f64, weight: f64) -> f64 {
    (1.0 - weight) * lo + weight * hi
}

/// Finds the bracketing nodes of `target` on a strictly increasing `axis`.
pub fn bracket(
    axis_name: &'static str,
    axis: &[f64],
    target: f64,
    policy: Extrapolation,
) -> Result<Bracket, LutError> {
    let (Some(&first), Some(&last)) = (axis.first(), axis.last()) else {
        return Err(LutError::Layout {
            variable: axis_name.to_string(),
            reason: "empty coordinate axis".to_string(),
        });
    };

    let outside = !target.is_finite() || target < first || target > last;
    if outside && (policy == Extrapolation::Error || target.is_nan()) {
        return Err(LutError::OutOfRange {
            axis: axis_name,
            value: target,
            min: first,
            max: last,
        });
    }

    let n = axis.len();
    if n == 1 {
        return Ok(Bracket {
            lo: 0,
            hi: 0,
            weight: 0.0,
        });
    }

    if target <= first {
        return Ok(Bracket {
            lo: 0,
            hi: 1,
            weight: 0.0,
        });
    }
    if target >= last {
        return Ok(Bracket {
            lo: n - 2,
            hi: n - 1,
            weight: 1.0,
        });
    }

    // Binary search for the enclosing interval, axis[lo] <= target < axis[hi]
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if axis[mid] <= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let weight = (target - axis[lo]) / (axis[hi] - axis[lo]);
    Ok(Bracket { lo, hi, weight })
}

/// Linear interpolation of `values` sampled on `axis`.
pub fn interp1(
    axis_name: &'static str,
    axis: &[f64],
    values: &[f64],
    target: f64,
    policy: Extrapolation,
) -> Result<f64, LutError> {
    if axis.len() != values.len() {
        return Err(LutError::ShapeMismatch {
            what: format!("values along {}", axis_name),
            expected: axis.len(),
            found: values.len(),
        });
    }

    Ok(bracket(axis_name, axis, target, policy)?.blend(values))
}

/// Bilinear interpolation of a row-major `grid` of shape `(rows.len(), cols.len())`.
pub fn interp2(
    rows: (&'static str, &[f64]),
    cols: (&'static str, &[f64]),
    grid: &[f64],
    target: (f64, f64),
    policy: Extrapolation,
) -> Result<f64, LutError> {
    let (row_name, row_axis) = rows;
    let (col_name, col_axis) = cols;
    let ncols = col_axis.len();

    if grid.len() != row_axis.len() * ncols {
        return Err(LutError::ShapeMismatch {
            what: format!("grid over ({}, {})", row_name, col_name),
            expected: row_axis.len() * ncols,
            found: grid.len(),
        });
    }

    let r = bracket(row_name, row_axis, target.0, policy)?;
    let c = bracket(col_name, col_axis, target.1, policy)?;

    // Remove the column dimension first, then the row dimension
    let at_lo = c.blend(&grid[r.lo * ncols..(r.lo + 1) * ncols]);
    let at_hi = c.blend(&grid[r.hi * ncols..(r.hi + 1) * ncols]);

    Ok(lerp(at_lo, at_hi, r.weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RH: [f64; 5] = [0.0, 50.0, 70.0, 90.0, 95.0];

    fn along_rh(values: &[f64], target: f64, policy: Extrapolation) -> Result<f64, LutError> {
        interp1("relative_humidity", &RH, values, target, policy)
    }

    #[test]
    fn test_nodes_are_reproduced_exactly() {
        let values = [0.1234567, 0.2345678, 0.3456789, 0.4567891, 0.5678912];
        for (node, expected) in RH.iter().zip(values.iter()) {
            let v = along_rh(&values, *node, Extrapolation::Error).unwrap();
            assert_eq!(v, *expected);
        }
    }

    #[test]
    fn test_interior_value_lies_between_nodes() {
        let values = [1.0, 2.0, 4.0, 8.0, 16.0];
        let v = along_rh(&values, 60.0, Extrapolation::Error).unwrap();
        assert_relative_eq!(v, 3.0);
        assert!(v > values[1] && v < values[2]);
    }

    #[test]
    fn test_out_of_range_errors_by_default() {
        let values = [1.0, 2.0, 4.0, 8.0, 16.0];
        let err = along_rh(&values, 99.0, Extrapolation::Error).unwrap_err();
        match err {
            LutError::OutOfRange { axis, value, min, max } => {
                assert_eq!(axis, "relative_humidity");
                assert_eq!(value, 99.0);
                assert_eq!(min, 0.0);
                assert_eq!(max, 95.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(along_rh(&values, -1.0, Extrapolation::Error).is_err());
        assert!(along_rh(&values, f64::NAN, Extrapolation::Clamp).is_err());
    }

    #[test]
    fn test_clamp_uses_edge_values() {
        let values = [1.0, 2.0, 4.0, 8.0, 16.0];
        let above = along_rh(&values, 99.0, Extrapolation::Clamp).unwrap();
        let below = along_rh(&values, -5.0, Extrapolation::Clamp).unwrap();
        assert_eq!(above, 16.0);
        assert_eq!(below, 1.0);

        let inf = f64::INFINITY;
        assert_eq!(along_rh(&values, inf, Extrapolation::Clamp).unwrap(), 16.0);
        assert!(along_rh(&values, inf, Extrapolation::Error).is_err());
    }

    #[test]
    fn test_single_node_axis() {
        let v = interp1("wavelength", &[550.0], &[1.5], 550.0, Extrapolation::Error).unwrap();
        assert_eq!(v, 1.5);
        assert!(interp1("wavelength", &[550.0], &[1.5], 551.0, Extrapolation::Error).is_err());
    }

    #[test]
    fn test_bilinear_matches_plane() {
        // f(rh, wl) = 2 rh + 0.01 wl is reproduced exactly by bilinear interpolation
        let rows = [0.0, 50.0, 90.0];
        let cols = [400.0, 550.0, 700.0, 1000.0];
        let grid: Vec<f64> = rows
            .iter()
            .flat_map(|rh| cols.iter().map(move |wl| 2.0 * rh + 0.01 * wl))
            .collect();

        let v = interp2(
            ("relative_humidity", &rows),
            ("wavelength", &cols),
            &grid,
            (65.0, 620.0),
            Extrapolation::Error,
        )
        .unwrap();
        assert_relative_eq!(v, 2.0 * 65.0 + 0.01 * 620.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bilinear_is_joint_not_separable() {
        // f(rh, wl) = rh * wl has a cross term that only a joint interpolation weights correctly
        let rows = [0.0, 100.0];
        let cols = [0.0, 100.0];
        let grid = [0.0, 0.0, 0.0, 10000.0];

        let v = interp2(
            ("relative_humidity", &rows),
            ("wavelength", &cols),
            &grid,
            (50.0, 50.0),
            Extrapolation::Error,
        )
        .unwrap();
        assert_relative_eq!(v, 2500.0);
    }

    #[test]
    fn test_grid_shape_mismatch() {
        let err = interp2(
            ("relative_humidity", &[0.0, 50.0]),
            ("wavelength", &[400.0, 550.0]),
            &[1.0, 2.0, 3.0],
            (10.0, 500.0),
            Extrapolation::Error,
        )
        .unwrap_err();
        assert!(matches!(err, LutError::ShapeMismatch { expected: 4, found: 3, .. }));
    }
}
