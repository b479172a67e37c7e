/// Per-dataset figures: the target distribution and the pairwise
/// correlation heatmap.

pub mod corr;
pub mod label;
