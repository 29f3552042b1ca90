//! Cost-matrix construction for LAP-based multi-object tracking.
//!
//! Detected spots and provisional track segments are turned into dense
//! square cost matrices whose optimal assignment, computed by an
//! external LAP solver, yields frame-to-frame links, gap closures,
//! merges and splits. The approach follows Jaqaman et al., "Robust
//! single-particle tracking in live-cell time-lapse sequences",
//! Nature Methods, 2008.

pub mod cost;
pub mod error;
pub mod linking;
pub mod math;
pub mod matrix;
pub mod my_types;
pub mod segment;
pub mod segment_matrix;
pub mod settings;
pub mod spot;
