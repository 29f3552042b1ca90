use std::collections::HashMap;

use crate::my_types::SpotId;

pub const POSITION_X: &str = "POSITION_X";
pub const POSITION_Y: &str = "POSITION_Y";
pub const POSITION_Z: &str = "POSITION_Z";

const POSITION_FEATURES: [&str; 3] = [POSITION_X, POSITION_Y, POSITION_Z];

/// A single detected object at one time frame. Spatial coordinates are
/// stored as features next to any other named scalar feature, and the
/// spot is not mutated once handed to a matrix creator.
#[derive(Clone, Debug)]
pub struct Spot {
    id: SpotId,
    frame: usize,
    features: HashMap<String, f64>,
}

impl Spot {
    pub fn new(id: SpotId, frame: usize, x: f64, y: f64, z: f64) -> Self {
        let mut features = HashMap::new();
        features.insert(POSITION_X.to_string(), x);
        features.insert(POSITION_Y.to_string(), y);
        features.insert(POSITION_Z.to_string(), z);
        Spot { id, frame, features }
    }

    pub fn with_feature(mut self, name: &str, value: f64) -> Self {
        self.features.insert(name.to_string(), value);
        self
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    /// Squared Euclidean distance over the position features. A missing
    /// coordinate counts as zero.
    pub fn squared_distance_to(&self, other: &Spot) -> f64 {
        let mut d2 = 0.;
        for name in POSITION_FEATURES {
            let a = self.feature(name).unwrap_or(0.);
            let b = other.feature(name).unwrap_or(0.);
            d2 += (a - b) * (a - b);
        }
        d2
    }

    /// Difference of a feature between two spots, normalized by their
    /// mean: `|a - b| / ((a + b) / 2)`. NaN when the feature is missing
    /// on either spot or the mean is zero; callers skip NaN penalties.
    pub fn normalized_diff(&self, other: &Spot, feature: &str) -> f64 {
        let (a, b) = match (self.feature(feature), other.feature(feature)) {
            (Some(a), Some(b)) => (a, b),
            _ => return f64::NAN,
        };
        let mean = (a + b) / 2.;
        if mean == 0. {
            return f64::NAN;
        }
        (a - b).abs() / mean
    }
}

impl PartialEq for Spot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Spot {}
