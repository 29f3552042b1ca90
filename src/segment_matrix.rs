use log::{debug, warn};

use crate::cost::{
    DefaultGapClosingCost, DefaultMergingCost, DefaultSplittingCost, GapClosingCost, MergingCost,
    SplittingCost,
};
use crate::error::{Result, TrackerError};
use crate::math::percentile;
use crate::matrix::{alternative_scores, finite_costs, lower_right, try_alloc_matrix};
use crate::my_types::Matrixd;
use crate::segment::TrackSegment;
use crate::settings::TrackerSettings;
use crate::spot::Spot;

/// Cutoff used when every candidate pair is blocked and there is no
/// finite cost to take a percentile of. The value is arbitrary; it only
/// matters that the alternative diagonals stay solvable.
pub const FALLBACK_CUTOFF: f64 = 10.0;

/// The finished segment-to-segment cost matrix together with the pruned
/// middle-point lists the caller needs to interpret matrix indices.
/// Built in one pass and never mutated afterwards.
#[derive(Debug)]
pub struct SegmentCostMatrix {
    costs: Matrixd,
    merging_middle_points: Vec<Spot>,
    splitting_middle_points: Vec<Spot>,
}

impl SegmentCostMatrix {
    pub fn costs(&self) -> &Matrixd {
        &self.costs
    }

    pub fn into_costs(self) -> Matrixd {
        self.costs
    }

    /// Middle points that survived merging-column pruning, in the same
    /// order as the merging columns of the matrix: column
    /// `segments + i` corresponds to entry `i` of this list.
    pub fn merging_middle_points(&self) -> &[Spot] {
        &self.merging_middle_points
    }

    /// Middle points that survived splitting-row pruning, in the same
    /// order as the splitting rows of the matrix.
    pub fn splitting_middle_points(&self) -> &[Spot] {
        &self.splitting_middle_points
    }
}

/// Builds the cost matrix for the global linking pass over track
/// segments, combining gap-closing, merging and splitting costs.
///
/// The top-left quadrant is itself a 2 x 2 block matrix:
/// gap closing (segments x segments), merging (segments x kept middle
/// points), splitting (kept middle points x segments) and a fully
/// blocked middle block. Middle points whose merging column or
/// splitting row is entirely blocked cannot participate in any event
/// and are pruned, which shrinks the matrix the solver sees without
/// changing the optimal assignment. The remaining quadrants are the
/// diagonal alternative scores and the transposed, cutoff-flattened
/// lower right block.
pub struct TrackSegmentCostMatrixCreator {
    gap_closing: Box<dyn GapClosingCost>,
    merging: Box<dyn MergingCost>,
    splitting: Box<dyn SplittingCost>,
}

impl TrackSegmentCostMatrixCreator {
    pub fn new(
        gap_closing: Box<dyn GapClosingCost>,
        merging: Box<dyn MergingCost>,
        splitting: Box<dyn SplittingCost>,
    ) -> Self {
        TrackSegmentCostMatrixCreator {
            gap_closing,
            merging,
            splitting,
        }
    }

    /// Uses the penalized squared-distance cost functions for all three
    /// event classes.
    pub fn with_default_costs() -> Self {
        Self::new(
            Box::new(DefaultGapClosingCost),
            Box::new(DefaultMergingCost),
            Box::new(DefaultSplittingCost),
        )
    }

    /// Builds the full square cost matrix over `segments`. Fails when
    /// no segments are supplied or the settings are invalid.
    pub fn process(
        &self,
        segments: &[TrackSegment],
        settings: &TrackerSettings,
    ) -> Result<SegmentCostMatrix> {
        if segments.is_empty() {
            return Err(TrackerError::NoSegments);
        }
        settings.validate()?;

        let n_segments = segments.len();
        let blocking_value = settings.blocking_value;

        // Candidates for merge and split events: every spot of a
        // segment with at least two spots. Skipped entirely when
        // neither event class is enabled.
        let middle_points: Vec<Spot> =
            if settings.allow_track_merging || settings.allow_track_splitting {
                segments
                    .iter()
                    .filter(|segment| segment.len() > 1)
                    .flat_map(|segment| segment.spots().iter().cloned())
                    .collect()
            } else {
                vec![]
            };

        debug!("computing gap-closing costs for {} segments", n_segments);
        let gap_closing_scores = self.gap_closing_scores(segments, settings)?;

        let top_left;
        let merging_middle_points;
        let splitting_middle_points;
        if !settings.allow_track_merging && !settings.allow_track_splitting {
            // Only the modest gap-closing matrix is needed.
            top_left = gap_closing_scores;
            merging_middle_points = vec![];
            splitting_middle_points = vec![];
        } else {
            debug!("computing merging costs for {} middle points", middle_points.len());
            let (merging_scores, merging_kept) = if settings.allow_track_merging {
                let raw = self.merging_scores(segments, &middle_points, settings)?;
                prune_columns(&raw, &middle_points, blocking_value)?
            } else {
                (try_alloc_matrix(n_segments, 0, blocking_value)?, vec![])
            };

            debug!("computing splitting costs for {} middle points", middle_points.len());
            let (splitting_scores, splitting_kept) = if settings.allow_track_splitting {
                let raw = self.splitting_scores(&middle_points, segments, settings)?;
                prune_rows(&raw, &middle_points, blocking_value)?
            } else {
                (try_alloc_matrix(0, n_segments, blocking_value)?, vec![])
            };

            // No direct cost is defined between two middle points.
            let middle_block =
                try_alloc_matrix(splitting_kept.len(), merging_kept.len(), blocking_value)?;

            let n_rows = n_segments + splitting_kept.len();
            let n_cols = n_segments + merging_kept.len();
            let mut quadrant = try_alloc_matrix(n_rows, n_cols, 0.)?;
            quadrant
                .view_mut((0, 0), (n_segments, n_segments))
                .copy_from(&gap_closing_scores);
            quadrant
                .view_mut((0, n_segments), (n_segments, merging_kept.len()))
                .copy_from(&merging_scores);
            quadrant
                .view_mut((n_segments, 0), (splitting_kept.len(), n_segments))
                .copy_from(&splitting_scores);
            quadrant
                .view_mut(
                    (n_segments, n_segments),
                    (splitting_kept.len(), merging_kept.len()),
                )
                .copy_from(&middle_block);

            top_left = quadrant;
            merging_middle_points = merging_kept;
            splitting_middle_points = splitting_kept;
        }

        let cutoff = self.cutoff(&top_left, settings)?;

        let n_rows = top_left.nrows();
        let n_cols = top_left.ncols();
        let top_right = alternative_scores(n_rows, cutoff, blocking_value)?;
        let bottom_left = alternative_scores(n_cols, cutoff, blocking_value)?;
        let bottom_right = lower_right(&top_left, cutoff, blocking_value)?;

        let n = 2 * n_segments + splitting_middle_points.len() + merging_middle_points.len();
        let mut costs = try_alloc_matrix(n, n, 0.)?;
        costs.view_mut((0, 0), (n_rows, n_cols)).copy_from(&top_left);
        costs
            .view_mut((0, n_cols), (n_rows, n_rows))
            .copy_from(&top_right);
        costs
            .view_mut((n_rows, 0), (n_cols, n_cols))
            .copy_from(&bottom_left);
        costs
            .view_mut((n_rows, n_cols), (n_cols, n_rows))
            .copy_from(&bottom_right);

        debug!("built {0} x {0} segment cost matrix", n);
        Ok(SegmentCostMatrix {
            costs,
            merging_middle_points,
            splitting_middle_points,
        })
    }

    /// Gap-closing sub-matrix: cost of linking the end of segment i to
    /// the start of segment j, for every ordered pair of distinct
    /// segments.
    fn gap_closing_scores(
        &self,
        segments: &[TrackSegment],
        settings: &TrackerSettings,
    ) -> Result<Matrixd> {
        let n = segments.len();
        let mut scores = try_alloc_matrix(n, n, settings.blocking_value)?;
        for (i, end) in segments.iter().enumerate() {
            for (j, start) in segments.iter().enumerate() {
                if i == j {
                    continue;
                }
                scores[(i, j)] = self.gap_closing.between(end, start, settings).map_err(
                    |err| TrackerError::CostEvaluation {
                        source_name: format!("segment ending at spot {}", end.last().id()),
                        target: format!("segment starting at spot {}", start.first().id()),
                        message: err.to_string(),
                    },
                )?;
            }
        }
        Ok(scores)
    }

    /// Raw merging sub-matrix over (segments x middle points), before
    /// column pruning.
    fn merging_scores(
        &self,
        segments: &[TrackSegment],
        middle_points: &[Spot],
        settings: &TrackerSettings,
    ) -> Result<Matrixd> {
        let mut scores =
            try_alloc_matrix(segments.len(), middle_points.len(), settings.blocking_value)?;
        for (i, end) in segments.iter().enumerate() {
            for (j, middle) in middle_points.iter().enumerate() {
                scores[(i, j)] = self.merging.between(end, middle, settings).map_err(|err| {
                    TrackerError::CostEvaluation {
                        source_name: format!("segment ending at spot {}", end.last().id()),
                        target: format!("middle spot {}", middle.id()),
                        message: err.to_string(),
                    }
                })?;
            }
        }
        Ok(scores)
    }

    /// Raw splitting sub-matrix over (middle points x segments), before
    /// row pruning.
    fn splitting_scores(
        &self,
        middle_points: &[Spot],
        segments: &[TrackSegment],
        settings: &TrackerSettings,
    ) -> Result<Matrixd> {
        let mut scores =
            try_alloc_matrix(middle_points.len(), segments.len(), settings.blocking_value)?;
        for (i, middle) in middle_points.iter().enumerate() {
            for (j, start) in segments.iter().enumerate() {
                scores[(i, j)] =
                    self.splitting
                        .between(middle, start, settings)
                        .map_err(|err| TrackerError::CostEvaluation {
                            source_name: format!("middle spot {}", middle.id()),
                            target: format!("segment starting at spot {}", start.first().id()),
                            message: err.to_string(),
                        })?;
            }
        }
        Ok(scores)
    }

    /// Percentile of all feasible top-left costs, scaled by the
    /// alternative cost factor. Falls back to [`FALLBACK_CUTOFF`] when
    /// every cost is blocked.
    fn cutoff(&self, top_left: &Matrixd, settings: &TrackerSettings) -> Result<f64> {
        let scores = finite_costs(top_left, settings.blocking_value);
        let p = percentile(&scores, settings.cutoff_percentile)?;
        let cutoff = if p < settings.blocking_value {
            p
        } else {
            warn!("no feasible segment cost, falling back to cutoff {}", FALLBACK_CUTOFF);
            FALLBACK_CUTOFF
        };
        Ok(settings.alternative_linking_cost_factor * cutoff)
    }
}

/// Drops every column whose entries are all blocked and returns the
/// pruned matrix together with the middle points backing the surviving
/// columns, left-to-right order preserved.
fn prune_columns(
    m: &Matrixd,
    middle_points: &[Spot],
    blocking_value: f64,
) -> Result<(Matrixd, Vec<Spot>)> {
    let mut kept_columns = vec![];
    let mut kept_spots = vec![];
    for j in 0..m.ncols() {
        let contains_cost = (0..m.nrows()).any(|i| m[(i, j)] < blocking_value);
        if contains_cost {
            kept_columns.push(j);
            kept_spots.push(middle_points[j].clone());
        }
    }

    let mut pruned = try_alloc_matrix(m.nrows(), kept_columns.len(), 0.)?;
    for (out_j, &j) in kept_columns.iter().enumerate() {
        for i in 0..m.nrows() {
            pruned[(i, out_j)] = m[(i, j)];
        }
    }
    Ok((pruned, kept_spots))
}

/// Row counterpart of [`prune_columns`], used for the splitting
/// sub-matrix.
fn prune_rows(
    m: &Matrixd,
    middle_points: &[Spot],
    blocking_value: f64,
) -> Result<(Matrixd, Vec<Spot>)> {
    let mut kept_rows = vec![];
    let mut kept_spots = vec![];
    for i in 0..m.nrows() {
        let contains_cost = (0..m.ncols()).any(|j| m[(i, j)] < blocking_value);
        if contains_cost {
            kept_rows.push(i);
            kept_spots.push(middle_points[i].clone());
        }
    }

    let mut pruned = try_alloc_matrix(kept_rows.len(), m.ncols(), 0.)?;
    for (out_i, &i) in kept_rows.iter().enumerate() {
        for j in 0..m.ncols() {
            pruned[(out_i, j)] = m[(i, j)];
        }
    }
    Ok((pruned, kept_spots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostResult;
    use crate::my_types::SpotId;

    struct FailingGapCost;

    impl GapClosingCost for FailingGapCost {
        fn between(
            &self,
            _end: &TrackSegment,
            _start: &TrackSegment,
            _settings: &TrackerSettings,
        ) -> CostResult {
            Err(anyhow::anyhow!("feature missing").into())
        }
    }

    fn spot(id: u64, frame: usize, x: f64, y: f64) -> Spot {
        Spot::new(SpotId(id), frame, x, y, 0.)
    }

    fn settings_1e9() -> TrackerSettings {
        TrackerSettings {
            blocking_value: 1e9,
            ..TrackerSettings::default()
        }
    }

    /// Two segments of two spots each, the second starting two frames
    /// after the first ends and one unit away: a clean gap-closing
    /// candidate under the default settings.
    fn gap_closing_fixture() -> Vec<TrackSegment> {
        vec![
            TrackSegment::new(vec![spot(0, 0, 0., 0.), spot(1, 1, 0., 1.)]),
            TrackSegment::new(vec![spot(2, 3, 0., 2.), spot(3, 4, 0., 3.)]),
        ]
    }

    /// Brute-force minimal-cost perfect assignment by enumerating
    /// permutations; only usable for tiny matrices.
    fn brute_force_assignment(costs: &Matrixd) -> Vec<usize> {
        fn recurse(
            costs: &Matrixd,
            row: usize,
            used: &mut Vec<bool>,
            current: &mut Vec<usize>,
            best_cost: &mut f64,
            best: &mut Vec<usize>,
        ) {
            if row == costs.nrows() {
                let total: f64 = current.iter().enumerate().map(|(i, &j)| costs[(i, j)]).sum();
                if total < *best_cost {
                    *best_cost = total;
                    *best = current.clone();
                }
                return;
            }
            for j in 0..costs.ncols() {
                if used[j] {
                    continue;
                }
                used[j] = true;
                current.push(j);
                recurse(costs, row + 1, used, current, best_cost, best);
                current.pop();
                used[j] = false;
            }
        }

        let mut best = vec![];
        let mut best_cost = f64::INFINITY;
        let mut used = vec![false; costs.ncols()];
        recurse(costs, 0, &mut used, &mut vec![], &mut best_cost, &mut best);
        best
    }

    /// The real links an assignment selects, read off the segment rows:
    /// gap closures onto other segments and merges onto middle points.
    /// Assignments into the alternative columns are not links.
    fn segment_links(
        assignment: &[usize],
        costs: &Matrixd,
        n_segments: usize,
        merging_points: &[Spot],
        blocking_value: f64,
    ) -> Vec<(usize, String)> {
        let mut links = vec![];
        for (i, &j) in assignment.iter().enumerate().take(n_segments) {
            if !(costs[(i, j)] < blocking_value) {
                continue;
            }
            if j < n_segments {
                links.push((i, format!("segment {}", j)));
            } else if j < n_segments + merging_points.len() {
                links.push((i, format!("spot {}", merging_points[j - n_segments].id())));
            }
        }
        links
    }

    #[test]
    fn test_empty_segments_rejected() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let err = creator.process(&[], &TrackerSettings::default()).unwrap_err();
        assert!(matches!(err, TrackerError::NoSegments));
    }

    #[test]
    fn test_cost_error_names_the_failing_segment_pair() {
        let creator = TrackSegmentCostMatrixCreator::new(
            Box::new(FailingGapCost),
            Box::new(DefaultMergingCost),
            Box::new(DefaultSplittingCost),
        );
        let segments = gap_closing_fixture();
        let err = creator
            .process(&segments, &TrackerSettings::default())
            .unwrap_err();
        match err {
            TrackerError::CostEvaluation { source_name: source, target, message } => {
                // the first evaluated pair: end of segment 0, start of
                // segment 1
                assert_eq!(source, "segment ending at spot 1");
                assert_eq!(target, "segment starting at spot 2");
                assert_eq!(message, "feature missing");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_gap_closing_only_matrix() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let segments = gap_closing_fixture();
        let settings = settings_1e9();

        let result = creator.process(&segments, &settings).unwrap();
        let costs = result.costs();

        // merging and splitting disabled: dimension is 2 * segments
        assert_eq!(costs.nrows(), 4);
        assert_eq!(costs.ncols(), 4);
        assert!(result.merging_middle_points().is_empty());
        assert!(result.splitting_middle_points().is_empty());

        // end of segment 0 to start of segment 1: distance 1, gap 2
        assert_eq!(costs[(0, 1)], 1.);
        // the reverse direction goes back in time
        assert_eq!(costs[(1, 0)], 1e9);
        // a segment cannot gap-close onto itself
        assert_eq!(costs[(0, 0)], 1e9);
        assert_eq!(costs[(1, 1)], 1e9);

        // alternatives carry factor * percentile of the single cost
        let cutoff = 1.05 * 1.;
        assert_eq!(costs[(0, 2)], cutoff);
        assert_eq!(costs[(1, 3)], cutoff);
        assert_eq!(costs[(2, 0)], cutoff);
        assert_eq!(costs[(3, 1)], cutoff);
        // lower right: transposed, flattened
        assert_eq!(costs[(3, 2)], cutoff);
        assert_eq!(costs[(2, 3)], 1e9);
    }

    #[test]
    fn test_squareness_with_merging_and_splitting() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = TrackerSettings {
            allow_track_merging: true,
            allow_track_splitting: true,
            ..settings_1e9()
        };
        // segment 1 runs alongside segment 0 and ends next to its
        // interior, segment 2 starts next to it one frame later
        let segments = vec![
            TrackSegment::new(vec![
                spot(0, 0, 0., 0.),
                spot(1, 1, 0., 1.),
                spot(2, 2, 0., 2.),
                spot(3, 3, 0., 3.),
            ]),
            TrackSegment::new(vec![spot(4, 0, 3., 0.), spot(5, 1, 1., 1.)]),
            TrackSegment::new(vec![spot(6, 2, 1., 2.), spot(7, 3, 3., 3.)]),
        ];

        let result = creator.process(&segments, &settings).unwrap();
        let costs = result.costs();
        let n = 2 * segments.len()
            + result.splitting_middle_points().len()
            + result.merging_middle_points().len();
        assert_eq!(costs.nrows(), n);
        assert_eq!(costs.ncols(), n);

        // every cell is a feasible cost or exactly the blocking value
        for &value in costs.iter() {
            assert!(
                value == settings.blocking_value
                    || (value.is_finite() && value < settings.blocking_value)
            );
        }
    }

    #[test]
    fn test_merging_column_pruning() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = TrackerSettings {
            allow_track_merging: true,
            merging_max_distance: 2.0,
            ..settings_1e9()
        };
        // Segment 0 spans frames 0..=2; segment 1 ends at frame 0 next
        // to segment 0's frame-1 spot. Only that middle point can
        // receive a merge: the others are either in the wrong frame or
        // too far.
        let segments = vec![
            TrackSegment::new(vec![
                spot(0, 0, 0., 0.),
                spot(1, 1, 0., 1.),
                spot(2, 2, 0., 2.),
            ]),
            TrackSegment::new(vec![spot(3, 0, 1., 1.)]),
        ];

        let result = creator.process(&segments, &settings).unwrap();

        // all three spots of segment 0 are candidates, one survives
        assert_eq!(result.merging_middle_points().len(), 1);
        assert_eq!(result.merging_middle_points()[0].id(), SpotId(1));
        assert!(result.splitting_middle_points().is_empty());

        let n = 2 * 2 + 0 + 1;
        assert_eq!(result.costs().nrows(), n);

        // the kept merging column holds the finite merge cost at the
        // row of segment 1
        let merge_cost = result.costs()[(1, 2)];
        assert!(merge_cost < settings.blocking_value);
        // segment 0 cannot merge into its own middle point in frame 1
        assert_eq!(result.costs()[(0, 2)], settings.blocking_value);
    }

    #[test]
    fn test_splitting_row_pruning() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = TrackerSettings {
            allow_track_splitting: true,
            splitting_max_distance: 2.0,
            ..settings_1e9()
        };
        // Segment 1 starts at frame 2 next to segment 0's frame-1 spot.
        let segments = vec![
            TrackSegment::new(vec![
                spot(0, 0, 0., 0.),
                spot(1, 1, 0., 1.),
                spot(2, 2, 0., 2.),
            ]),
            TrackSegment::new(vec![spot(3, 2, 1., 1.), spot(4, 3, 2., 1.)]),
        ];

        let result = creator.process(&segments, &settings).unwrap();

        // candidates are all five spots of both segments; the kept rows
        // must each contain a finite cost
        assert!(!result.splitting_middle_points().is_empty());
        for kept in result.splitting_middle_points() {
            // frame of a kept middle point must be one before some
            // segment start within range; here that is frame 1
            assert_eq!(kept.frame(), 1);
        }
        assert!(result.merging_middle_points().is_empty());
    }

    #[test]
    fn test_pruned_columns_were_all_blocked() {
        // Exercise the pruning helpers directly on a handcrafted
        // matrix.
        let b = 1e9;
        let m = nalgebra::dmatrix![
            1., b, b, 4.;
            2., b, b, b
        ];
        let middle_points: Vec<Spot> = (0..4).map(|i| spot(i, 0, 0., 0.)).collect();

        let (pruned, kept) = prune_columns(&m, &middle_points, b).unwrap();
        assert_eq!(pruned.ncols(), 2);
        assert_eq!(pruned.nrows(), 2);
        assert_eq!(kept.len(), 2);
        // order preserved
        assert_eq!(kept[0].id(), SpotId(0));
        assert_eq!(kept[1].id(), SpotId(3));
        assert_eq!(pruned[(0, 0)], 1.);
        assert_eq!(pruned[(0, 1)], 4.);
        assert_eq!(pruned[(1, 1)], b);

        let (pruned, kept) = prune_rows(&m.transpose(), &middle_points, b).unwrap();
        assert_eq!(pruned.nrows(), 2);
        assert_eq!(kept[0].id(), SpotId(0));
        assert_eq!(kept[1].id(), SpotId(3));
    }

    #[test]
    fn test_fallback_cutoff_when_everything_blocked() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = settings_1e9();
        // Segments overlap in time, so no gap-closing link is feasible.
        let segments = vec![
            TrackSegment::new(vec![spot(0, 0, 0., 0.), spot(1, 1, 0., 1.)]),
            TrackSegment::new(vec![spot(2, 0, 5., 0.), spot(3, 1, 5., 1.)]),
        ];

        let result = creator.process(&segments, &settings).unwrap();
        let costs = result.costs();

        // The alternative diagonal carries factor * FALLBACK_CUTOFF.
        // That constant is an arbitrary stand-in, not a principled
        // default; this test documents the behavior rather than
        // endorsing it.
        let expected = 1.05 * FALLBACK_CUTOFF;
        assert_eq!(costs[(0, 2)], expected);
        assert_eq!(costs[(1, 3)], expected);
        assert_eq!(costs[(2, 0)], expected);
        assert_eq!(costs[(3, 1)], expected);
    }

    #[test]
    fn test_brute_force_assignment_picks_gap_closing_link() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let segments = gap_closing_fixture();
        let settings = settings_1e9();

        let result = creator.process(&segments, &settings).unwrap();
        let assignment = brute_force_assignment(result.costs());

        // row 0 (end of segment 0) is assigned to column 1 (start of
        // segment 1): the gap-closing link beats the alternatives
        assert_eq!(assignment[0], 1);
    }

    #[test]
    fn test_pruning_preserves_optimal_assignment() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = TrackerSettings {
            allow_track_merging: true,
            merging_max_distance: 2.0,
            ..settings_1e9()
        };
        // Segment 1 ends at frame 0 next to segment 0's frame-1 spot:
        // one feasible merge, no feasible gap closure. Two of the three
        // middle-point columns are fully blocked and get pruned.
        let segments = vec![
            TrackSegment::new(vec![
                spot(0, 0, 0., 0.),
                spot(1, 1, 0., 1.),
                spot(2, 2, 0., 2.),
            ]),
            TrackSegment::new(vec![spot(3, 0, 1., 1.)]),
        ];
        let middle_points: Vec<Spot> = segments[0].spots().to_vec();
        let n = segments.len();
        let b = settings.blocking_value;

        let result = creator.process(&segments, &settings).unwrap();
        assert_eq!(result.merging_middle_points().len(), 1);

        // Assemble the same matrix without pruning the all-blocked
        // merging columns.
        let gap = creator.gap_closing_scores(&segments, &settings).unwrap();
        let merging = creator
            .merging_scores(&segments, &middle_points, &settings)
            .unwrap();
        let mut top_left = try_alloc_matrix(n, n + middle_points.len(), b).unwrap();
        top_left.view_mut((0, 0), (n, n)).copy_from(&gap);
        top_left
            .view_mut((0, n), (n, middle_points.len()))
            .copy_from(&merging);
        // the feasible costs are unchanged by pruning, so the cutoff
        // derived from them is the same
        let cutoff = creator.cutoff(&top_left, &settings).unwrap();

        let n_rows = top_left.nrows();
        let n_cols = top_left.ncols();
        let top_right = alternative_scores(n_rows, cutoff, b).unwrap();
        let bottom_left = alternative_scores(n_cols, cutoff, b).unwrap();
        let bottom_right = lower_right(&top_left, cutoff, b).unwrap();
        let full = n_rows + n_cols;
        let mut unpruned = try_alloc_matrix(full, full, 0.).unwrap();
        unpruned.view_mut((0, 0), (n_rows, n_cols)).copy_from(&top_left);
        unpruned
            .view_mut((0, n_cols), (n_rows, n_rows))
            .copy_from(&top_right);
        unpruned
            .view_mut((n_rows, 0), (n_cols, n_cols))
            .copy_from(&bottom_left);
        unpruned
            .view_mut((n_rows, n_cols), (n_cols, n_rows))
            .copy_from(&bottom_right);

        let pruned_links = segment_links(
            &brute_force_assignment(result.costs()),
            result.costs(),
            n,
            result.merging_middle_points(),
            b,
        );
        let unpruned_links = segment_links(
            &brute_force_assignment(&unpruned),
            &unpruned,
            n,
            &middle_points,
            b,
        );

        // dropping all-blocked columns does not change which links the
        // optimal assignment selects
        assert_eq!(pruned_links, unpruned_links);
        assert_eq!(pruned_links, vec![(1, "spot 1".to_string())]);
    }

    #[test]
    fn test_process_is_deterministic() {
        let creator = TrackSegmentCostMatrixCreator::with_default_costs();
        let settings = TrackerSettings {
            allow_track_merging: true,
            allow_track_splitting: true,
            ..settings_1e9()
        };
        let segments = vec![
            TrackSegment::new(vec![
                spot(0, 0, 0., 0.),
                spot(1, 1, 0., 1.),
                spot(2, 2, 0., 2.),
            ]),
            TrackSegment::new(vec![spot(3, 0, 1., 0.), spot(4, 1, 1., 1.)]),
            TrackSegment::new(vec![spot(5, 2, 1., 2.), spot(6, 3, 1., 3.)]),
        ];

        let a = creator.process(&segments, &settings).unwrap();
        let b = creator.process(&segments, &settings).unwrap();
        assert_eq!(a.costs(), b.costs());
        assert_eq!(
            a.merging_middle_points().len(),
            b.merging_middle_points().len()
        );
        assert_eq!(
            a.splitting_middle_points().len(),
            b.splitting_middle_points().len()
        );
    }
}
