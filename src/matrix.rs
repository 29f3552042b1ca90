use crate::error::{Result, TrackerError};
use crate::my_types::Matrixd;

/// Allocates a dense rows x cols matrix filled with `fill`, reporting
/// allocation failure as an error instead of aborting. Large tracking
/// problems can request matrices that do not fit in memory, and the
/// caller may want to retry with a smaller problem.
pub fn try_alloc_matrix(rows: usize, cols: usize, fill: f64) -> Result<Matrixd> {
    let len = rows
        .checked_mul(cols)
        .ok_or(TrackerError::NotEnoughMemory { rows, cols })?;
    let mut data: Vec<f64> = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TrackerError::NotEnoughMemory { rows, cols })?;
    data.resize(len, fill);
    Ok(Matrixd::from_vec(rows, cols, data))
}

/// An n x n matrix holding the blocking value everywhere except on the
/// main diagonal, which holds `cutoff`. Each diagonal entry stands for
/// "this candidate takes the no-link alternative at a fixed cost".
pub fn alternative_scores(n: usize, cutoff: f64, blocking_value: f64) -> Result<Matrixd> {
    let mut m = try_alloc_matrix(n, n, blocking_value)?;
    for i in 0..n {
        m[(i, i)] = cutoff;
    }
    Ok(m)
}

/// The lower-right quadrant of a LAP cost matrix: the transpose of
/// `top_left` with every non-blocked entry replaced by `cutoff`.
/// Without this quadrant the assignment problem is under-constrained on
/// the alternative side.
pub fn lower_right(top_left: &Matrixd, cutoff: f64, blocking_value: f64) -> Result<Matrixd> {
    let mut m = try_alloc_matrix(top_left.ncols(), top_left.nrows(), 0.)?;
    for i in 0..top_left.nrows() {
        for j in 0..top_left.ncols() {
            let value = top_left[(i, j)];
            m[(j, i)] = if value < blocking_value { cutoff } else { value };
        }
    }
    Ok(m)
}

/// True when no cell of `m` holds a feasible cost. Solvers can hang on
/// fully blocked matrices, so callers check this before solving.
pub fn is_all_blocked(m: &Matrixd, blocking_value: f64) -> bool {
    m.iter().all(|&value| !(value < blocking_value))
}

/// All feasible costs of `m`, in column-major traversal order.
pub fn finite_costs(m: &Matrixd, blocking_value: f64) -> Vec<f64> {
    m.iter().copied().filter(|&v| v < blocking_value).collect()
}
