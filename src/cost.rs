use crate::segment::TrackSegment;
use crate::settings::{FeaturePenalties, TrackerSettings};
use crate::spot::Spot;

/// Elementary cost functions may fail with any error; the matrix
/// creators wrap the failure together with the identity of the pair.
pub type CostResult = std::result::Result<f64, Box<dyn std::error::Error + Send + Sync>>;

/// Cost of linking a spot in frame t to a spot in frame t + 1.
/// Returning the configured blocking value marks the pair infeasible.
pub trait LinkingCost {
    fn between(&self, s0: &Spot, s1: &Spot, settings: &TrackerSettings) -> CostResult;
}

/// Cost of bridging the end of one track segment to the start of
/// another across a frame gap.
pub trait GapClosingCost {
    fn between(
        &self,
        end: &TrackSegment,
        start: &TrackSegment,
        settings: &TrackerSettings,
    ) -> CostResult;
}

/// Cost of linking the end of a segment into the middle of another
/// track (two objects becoming one).
pub trait MergingCost {
    fn between(&self, end: &TrackSegment, middle: &Spot, settings: &TrackerSettings) -> CostResult;
}

/// Cost of linking the start of a segment out of the middle of another
/// track (one object becoming two).
pub trait SplittingCost {
    fn between(&self, middle: &Spot, start: &TrackSegment, settings: &TrackerSettings)
        -> CostResult;
}

/// Penalized squared-distance cost shared by all default cost
/// functions.
///
/// The distance between the spots is gated by `max_distance`; within
/// range, each feature penalty contributes `1.5 * weight * ndiff` where
/// `ndiff` is the mean-normalized feature difference, and the cost is
/// `d^2 * (1 + sum of penalties)^2`. With a weight of 1, two spots whose
/// feature values differ by a factor of two look twice as far apart.
pub fn penalized_link_cost(
    s0: &Spot,
    s1: &Spot,
    max_distance: f64,
    blocking_value: f64,
    penalties: &FeaturePenalties,
) -> f64 {
    let d2 = s0.squared_distance_to(s1);
    if d2 > max_distance * max_distance {
        return blocking_value;
    }

    let mut penalty = 1.;
    for (feature, weight) in penalties {
        let ndiff = s0.normalized_diff(s1, feature);
        if ndiff.is_nan() {
            continue;
        }
        penalty += weight * 1.5 * ndiff;
    }

    d2 * penalty * penalty
}

/// Frame-to-frame linking cost: penalized squared distance gated by the
/// maximal linking distance.
#[derive(Debug, Default)]
pub struct DefaultLinkingCost;

impl LinkingCost for DefaultLinkingCost {
    fn between(&self, s0: &Spot, s1: &Spot, settings: &TrackerSettings) -> CostResult {
        Ok(penalized_link_cost(
            s0,
            s1,
            settings.linking_max_distance,
            settings.blocking_value,
            &settings.linking_feature_penalties,
        ))
    }
}

/// Gap-closing cost between the last spot of one segment and the first
/// spot of another. The frame gap must be at least 1 and at most the
/// configured maximum; with gap closing disabled only adjacent frames
/// qualify.
#[derive(Debug, Default)]
pub struct DefaultGapClosingCost;

impl GapClosingCost for DefaultGapClosingCost {
    fn between(
        &self,
        end: &TrackSegment,
        start: &TrackSegment,
        settings: &TrackerSettings,
    ) -> CostResult {
        let s0 = end.last();
        let s1 = start.first();

        let max_gap = if settings.allow_gap_closing {
            settings.gap_closing_max_frame_gap as usize
        } else {
            1
        };
        if s1.frame() <= s0.frame() || s1.frame() - s0.frame() > max_gap {
            return Ok(settings.blocking_value);
        }

        Ok(penalized_link_cost(
            s0,
            s1,
            settings.gap_closing_max_distance,
            settings.blocking_value,
            &settings.gap_closing_feature_penalties,
        ))
    }
}

/// Merging cost between the last spot of a segment and a middle point
/// one frame later.
#[derive(Debug, Default)]
pub struct DefaultMergingCost;

impl MergingCost for DefaultMergingCost {
    fn between(&self, end: &TrackSegment, middle: &Spot, settings: &TrackerSettings) -> CostResult {
        let s0 = end.last();
        if middle.frame() != s0.frame() + 1 {
            return Ok(settings.blocking_value);
        }

        Ok(penalized_link_cost(
            s0,
            middle,
            settings.merging_max_distance,
            settings.blocking_value,
            &settings.merging_feature_penalties,
        ))
    }
}

/// Splitting cost between a middle point and the first spot of a
/// segment one frame later.
#[derive(Debug, Default)]
pub struct DefaultSplittingCost;

impl SplittingCost for DefaultSplittingCost {
    fn between(
        &self,
        middle: &Spot,
        start: &TrackSegment,
        settings: &TrackerSettings,
    ) -> CostResult {
        let s1 = start.first();
        if s1.frame() != middle.frame() + 1 {
            return Ok(settings.blocking_value);
        }

        Ok(penalized_link_cost(
            middle,
            s1,
            settings.splitting_max_distance,
            settings.blocking_value,
            &settings.splitting_feature_penalties,
        ))
    }
}
