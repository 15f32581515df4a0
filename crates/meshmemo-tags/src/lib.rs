//! # meshmemo-tags
//!
//! The tag co-occurrence network: a symmetric weighted graph over tags,
//! updated incrementally with an exponential blend, scored with PMI, and
//! used for query expansion and tag boosting.

pub mod boost;
pub mod matrix;
pub mod snapshot;

pub use boost::TagBoostParams;
pub use matrix::TagCooccurrenceMatrix;
pub use snapshot::MatrixSnapshot;
