//! Diversity-aware reselection.

pub mod mmr;

pub use mmr::{metadata_similarity, value_similarity, DiversitySampler};
