use crate::error::{Result, TrackerError};

/// Estimates the p-th percentile of `values` with the usual
/// `pos = p * (n + 1)` rule and linear interpolation between the two
/// nearest order statistics, clamping at both extremes.
///
/// Returns NaN for an empty slice, and the single value for n = 1.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if !(p > 0. && p <= 1.) {
        return Err(TrackerError::InvalidSettings(format!(
            "invalid percentile value: {}",
            p
        )));
    }

    let size = values.len();
    if size == 0 {
        return Ok(f64::NAN);
    }
    if size == 1 {
        return Ok(values[0]);
    }

    let n = size as f64;
    let pos = p * (n + 1.);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    if pos < 1. {
        return Ok(sorted[0]);
    }
    if pos >= n {
        return Ok(sorted[size - 1]);
    }

    let fpos = pos.floor();
    let int_pos = fpos as usize;
    let dif = pos - fpos;
    let lower = sorted[int_pos - 1];
    let upper = sorted[int_pos];
    Ok(lower + dif * (upper - lower))
}
