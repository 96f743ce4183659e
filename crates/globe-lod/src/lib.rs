//! Level-of-detail selection: response curves, view-angle level selection,
//! and per-frame level buckets.

mod buckets;
mod curve;
mod selector;

pub use buckets::LodBuckets;
pub use curve::ResponseCurve;
pub use selector::LodSelector;
