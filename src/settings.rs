use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, TrackerError};

/// Weight per spot feature name, applied as a penalty on top of the
/// distance cost when two candidate spots differ in that feature.
pub type FeaturePenalties = HashMap<String, f64>;

/// Tracker configuration, consumed by the cost functions and by the
/// matrix creators. All fields are named and typed, and validated once
/// with [`TrackerSettings::validate`] before any matrix is built.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Maximal distance between two spots for a frame-to-frame link,
    /// in physical units.
    pub linking_max_distance: f64,
    pub linking_feature_penalties: FeaturePenalties,

    pub allow_gap_closing: bool,
    /// Maximal number of frames a gap-closing link may bridge. A value
    /// of 1 restricts gap closing to adjacent frames.
    pub gap_closing_max_frame_gap: u32,
    pub gap_closing_max_distance: f64,
    pub gap_closing_feature_penalties: FeaturePenalties,

    pub allow_track_splitting: bool,
    pub splitting_max_distance: f64,
    pub splitting_feature_penalties: FeaturePenalties,

    pub allow_track_merging: bool,
    pub merging_max_distance: f64,
    pub merging_feature_penalties: FeaturePenalties,

    /// Sentinel cost larger than any true cost, standing for
    /// "this pairing is infeasible".
    pub blocking_value: f64,
    /// Scale applied to the cutoff that fills the alternative
    /// (no-link) regions of the matrices.
    pub alternative_linking_cost_factor: f64,
    /// Percentile of the observed finite costs used as the cutoff base,
    /// in (0, 1].
    pub cutoff_percentile: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        TrackerSettings {
            linking_max_distance: 15.0,
            linking_feature_penalties: FeaturePenalties::new(),
            allow_gap_closing: true,
            gap_closing_max_frame_gap: 2,
            gap_closing_max_distance: 15.0,
            gap_closing_feature_penalties: FeaturePenalties::new(),
            allow_track_splitting: false,
            splitting_max_distance: 15.0,
            splitting_feature_penalties: FeaturePenalties::new(),
            allow_track_merging: false,
            merging_max_distance: 15.0,
            merging_feature_penalties: FeaturePenalties::new(),
            blocking_value: f64::INFINITY,
            alternative_linking_cost_factor: 1.05,
            cutoff_percentile: 0.9,
        }
    }
}

impl TrackerSettings {
    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = vec![];

        check_distance("linking_max_distance", self.linking_max_distance, &mut problems);
        check_distance("gap_closing_max_distance", self.gap_closing_max_distance, &mut problems);
        check_distance("splitting_max_distance", self.splitting_max_distance, &mut problems);
        check_distance("merging_max_distance", self.merging_max_distance, &mut problems);

        if self.gap_closing_max_frame_gap < 1 {
            problems.push("gap_closing_max_frame_gap must be at least 1".to_string());
        }
        if self.blocking_value.is_nan() || self.blocking_value <= 0. {
            problems.push(format!(
                "blocking_value must be positive, got {}",
                self.blocking_value
            ));
        }
        if !self.alternative_linking_cost_factor.is_finite()
            || self.alternative_linking_cost_factor <= 0.
        {
            problems.push(format!(
                "alternative_linking_cost_factor must be positive and finite, got {}",
                self.alternative_linking_cost_factor
            ));
        }
        if !(self.cutoff_percentile > 0. && self.cutoff_percentile <= 1.) {
            problems.push(format!(
                "cutoff_percentile must be in (0, 1], got {}",
                self.cutoff_percentile
            ));
        }

        check_penalties("linking_feature_penalties", &self.linking_feature_penalties, &mut problems);
        check_penalties("gap_closing_feature_penalties", &self.gap_closing_feature_penalties, &mut problems);
        check_penalties("splitting_feature_penalties", &self.splitting_feature_penalties, &mut problems);
        check_penalties("merging_feature_penalties", &self.merging_feature_penalties, &mut problems);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::InvalidSettings(problems.join("\n")))
        }
    }
}

fn check_distance(name: &str, value: f64, problems: &mut Vec<String>) {
    if !value.is_finite() || value <= 0. {
        problems.push(format!("{} must be positive and finite, got {}", name, value));
    }
}

fn check_penalties(name: &str, penalties: &FeaturePenalties, problems: &mut Vec<String>) {
    for (feature, weight) in penalties {
        if !weight.is_finite() || *weight < 0. {
            problems.push(format!(
                "{}: weight for feature {} must be non-negative and finite, got {}",
                name, feature, weight
            ));
        }
    }
}
