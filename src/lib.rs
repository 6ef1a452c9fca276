//! Reconstructs a single evolving storm entity from independently detected
//! cluster objects: rotation-shear maxima per tilt and sense, storm cells,
//! and echo tops, associated across scan times and elevation tilts.
//!
//! The pipeline runs once per offline case, to completion:
//! reference selection -> bidirectional temporal tracking per sense ->
//! sense arbitration -> vertical tilt stacking -> auxiliary object matching,
//! producing an ordered [`engine::StormGroup`] sequence.

pub mod config;
pub mod engine;
pub mod geo;
pub mod loader;
pub mod output;
pub mod store;
