use crate::spot::Spot;

/// An ordered, duplicate-free run of spots believed to belong to one
/// trajectory, sorted by frame index. Never empty.
#[derive(Clone, Debug)]
pub struct TrackSegment {
    spots: Vec<Spot>,
}

impl TrackSegment {
    /// Sorts the spots by frame and drops duplicates, keeping the first
    /// spot seen for a given frame.
    pub fn new(mut spots: Vec<Spot>) -> Self {
        assert!(!spots.is_empty(), "a track segment cannot be empty");
        spots.sort_by_key(|s| s.frame());
        spots.dedup_by_key(|s| s.frame());
        TrackSegment { spots }
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    // No is_empty companion: the constructor guarantees at least one
    // spot, so emptiness is not a state a segment can be in.
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// First spot in time, the candidate target of gap-closing and
    /// splitting links.
    pub fn first(&self) -> &Spot {
        &self.spots[0]
    }

    /// Last spot in time, the candidate source of gap-closing and
    /// merging links.
    pub fn last(&self) -> &Spot {
        &self.spots[self.spots.len() - 1]
    }
}
