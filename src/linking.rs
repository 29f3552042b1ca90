use log::debug;

use crate::cost::{DefaultLinkingCost, LinkingCost};
use crate::error::{Result, TrackerError};
use crate::matrix::{alternative_scores, lower_right, try_alloc_matrix};
use crate::my_types::Matrixd;
use crate::settings::TrackerSettings;
use crate::spot::Spot;

/// Builds the frame-to-frame linking cost matrix.
///
/// For spots `t0` in one frame and `t1` in the next, the matrix has
/// dimension `|t0| + |t1|` and four quadrants: pairwise linking costs in
/// the top left, diagonal termination alternatives in the top right,
/// diagonal initiation alternatives in the bottom left, and the
/// transposed, cutoff-flattened top left in the bottom right. The
/// optimal assignment of this matrix links spots between the two frames
/// or routes them to their no-link alternative.
pub struct LinkingCostMatrixCreator {
    cost: Box<dyn LinkingCost>,
}

impl LinkingCostMatrixCreator {
    pub fn new(cost: Box<dyn LinkingCost>) -> Self {
        LinkingCostMatrixCreator { cost }
    }

    /// Uses the penalized squared-distance linking cost.
    pub fn with_default_cost() -> Self {
        Self::new(Box::new(DefaultLinkingCost))
    }

    /// Builds the full square cost matrix for one frame pair. The
    /// settings are validated before any cost is computed.
    pub fn process(&self, t0: &[Spot], t1: &[Spot], settings: &TrackerSettings) -> Result<Matrixd> {
        settings.validate()?;

        let n0 = t0.len();
        let n1 = t1.len();
        let blocking_value = settings.blocking_value;

        // Degenerate frames first: nothing to link.
        if n0 == 0 && n1 == 0 {
            return Ok(Matrixd::zeros(0, 0));
        }
        if n1 == 0 {
            // Every t0 spot terminates at zero cost.
            return alternative_scores(n0, 0., blocking_value);
        }
        if n0 == 0 {
            // Every t1 spot initiates at zero cost.
            return alternative_scores(n1, 0., blocking_value);
        }

        // Top left: pairwise linking costs.
        let mut top_left = try_alloc_matrix(n0, n1, blocking_value)?;
        let mut max_cost = f64::NEG_INFINITY;
        for (i, s0) in t0.iter().enumerate() {
            for (j, s1) in t1.iter().enumerate() {
                let cost = self.cost.between(s0, s1, settings).map_err(|err| {
                    TrackerError::CostEvaluation {
                        source_name: format!("spot {}", s0.id()),
                        target: format!("spot {}", s1.id()),
                        message: err.to_string(),
                    }
                })?;
                if cost < blocking_value {
                    max_cost = max_cost.max(cost);
                }
                top_left[(i, j)] = cost;
            }
        }

        // The alternative cost is a fixed multiple of the largest
        // feasible cost. When every pair is blocked there is nothing to
        // derive it from and the alternatives stay blocked as well; such
        // a matrix should be skipped by the caller, see
        // `matrix::is_all_blocked`.
        let cutoff = if max_cost > f64::NEG_INFINITY {
            settings.alternative_linking_cost_factor * max_cost
        } else {
            debug!("all {} x {} linking costs blocked", n0, n1);
            blocking_value
        };

        let top_right = alternative_scores(n0, cutoff, blocking_value)?;
        let bottom_left = alternative_scores(n1, cutoff, blocking_value)?;
        let bottom_right = lower_right(&top_left, cutoff, blocking_value)?;

        let n = n0 + n1;
        let mut costs = try_alloc_matrix(n, n, 0.)?;
        costs.view_mut((0, 0), (n0, n1)).copy_from(&top_left);
        costs.view_mut((0, n1), (n0, n0)).copy_from(&top_right);
        costs.view_mut((n0, 0), (n1, n1)).copy_from(&bottom_left);
        costs.view_mut((n0, n1), (n1, n0)).copy_from(&bottom_right);

        debug!("built {0} x {0} linking cost matrix", n);
        Ok(costs)
    }
}
