//! JSON snapshot of a [`TagCooccurrenceMatrix`].
//!
//! Maps are ordered so that `to_json(from_json(s)) == s` for any `s` produced
//! by `to_json`. Snapshots written before per-edge counts existed store each
//! edge as a bare weight; those still load, with `count` set to 0.

use std::collections::BTreeMap;

use meshmemo_core::constants::SNAPSHOT_FORMAT_VERSION;
use meshmemo_core::errors::{MeshResult, TagMatrixError};
use serde::{Deserialize, Serialize};

use crate::matrix::{Edge, MatrixState, TagCooccurrenceMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeSnapshot {
    Full { weight: f64, count: u64 },
    Weight(f64),
}

impl EdgeSnapshot {
    fn weight(&self) -> f64 {
        match self {
            Self::Full { weight, .. } | Self::Weight(weight) => *weight,
        }
    }

    fn count(&self) -> u64 {
        match self {
            Self::Full { count, .. } => *count,
            Self::Weight(_) => 0,
        }
    }
}

fn default_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

/// Persisted matrix state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub alpha: f64,
    pub beta: f64,
    #[serde(default)]
    pub cooccurrence: BTreeMap<String, BTreeMap<String, EdgeSnapshot>>,
    #[serde(default)]
    pub frequencies: BTreeMap<String, f64>,
    #[serde(default)]
    pub total_count: f64,
    #[serde(default)]
    pub total_updates: u64,
    #[serde(default)]
    pub min_cooccurrence: f64,
}

impl MatrixSnapshot {
    fn corrupted(reason: impl Into<String>) -> TagMatrixError {
        TagMatrixError::SnapshotCorrupted {
            reason: reason.into(),
        }
    }

    /// Reject snapshots that would break matrix invariants once loaded.
    pub fn validate(&self) -> Result<(), TagMatrixError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(TagMatrixError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() || !self.total_count.is_finite() {
            return Err(Self::corrupted("non-finite parameter"));
        }
        for (tag, freq) in &self.frequencies {
            if !freq.is_finite() {
                return Err(Self::corrupted(format!("non-finite frequency for '{tag}'")));
            }
        }
        for (a, row) in &self.cooccurrence {
            for (b, edge) in row {
                if a == b {
                    return Err(Self::corrupted(format!("self edge on '{a}'")));
                }
                if !edge.weight().is_finite() {
                    return Err(Self::corrupted(format!("non-finite weight on '{a}'-'{b}'")));
                }
                let mirrored = self.cooccurrence.get(b).and_then(|r| r.get(a));
                if mirrored.map(EdgeSnapshot::weight) != Some(edge.weight()) {
                    return Err(Self::corrupted(format!("asymmetric edge '{a}'-'{b}'")));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn from_state(state: &MatrixState) -> Self {
        let cooccurrence = state
            .edges
            .iter()
            .map(|(a, row)| {
                let row = row
                    .iter()
                    .map(|(b, e)| {
                        (
                            b.clone(),
                            EdgeSnapshot::Full {
                                weight: e.weight,
                                count: e.count,
                            },
                        )
                    })
                    .collect();
                (a.clone(), row)
            })
            .collect();

        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            alpha: state.alpha,
            beta: state.beta,
            cooccurrence,
            frequencies: state.frequencies.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            total_count: state.total_count,
            total_updates: state.total_updates,
            min_cooccurrence: state.min_cooccurrence,
        }
    }

    pub(crate) fn into_state(self) -> MatrixState {
        let mut state = MatrixState::empty(self.alpha, self.beta);
        state.edges = self
            .cooccurrence
            .into_iter()
            .map(|(a, row)| {
                let row = row
                    .into_iter()
                    .map(|(b, e)| {
                        (
                            b,
                            Edge {
                                weight: e.weight(),
                                count: e.count(),
                            },
                        )
                    })
                    .collect();
                (a, row)
            })
            .collect();
        state.frequencies = self.frequencies.into_iter().collect();
        state.total_count = self.total_count;
        state.total_updates = self.total_updates;
        state.min_cooccurrence = self.min_cooccurrence;
        state
    }
}

impl TagCooccurrenceMatrix {
    pub fn snapshot(&self) -> MatrixSnapshot {
        MatrixSnapshot::from_state(&self.read())
    }

    pub fn from_snapshot(snapshot: MatrixSnapshot) -> MeshResult<Self> {
        snapshot.validate()?;
        Ok(Self::from_state(snapshot.into_state()))
    }

    pub fn to_json(&self) -> MeshResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> MeshResult<Self> {
        let snapshot: MatrixSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmemo_core::MeshError;

    fn sample() -> TagCooccurrenceMatrix {
        let m = TagCooccurrenceMatrix::new(0.8, 0.2);
        m.update("red", "formal", 1.0).unwrap();
        m.update("red", "dress", 0.5).unwrap();
        m.update("formal", "suit", 2.0).unwrap();
        m.update("red", "formal", 1.0).unwrap();
        m
    }

    #[test]
    fn json_round_trip_is_byte_identical() {
        let json = sample().to_json().unwrap();
        let restored = TagCooccurrenceMatrix::from_json(&json).unwrap();
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn round_trip_preserves_counts_and_stats() {
        let m = sample();
        let restored = TagCooccurrenceMatrix::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(restored.stats(), m.stats());
        assert_eq!(restored.edge_count("red", "formal"), 2);
    }

    #[test]
    fn legacy_weight_only_edges_load() {
        let json = r#"{
            "alpha": 0.8, "beta": 0.2,
            "cooccurrence": {"a": {"b": 0.8}, "b": {"a": 0.8}},
            "frequencies": {"a": 1.0, "b": 1.0},
            "total_count": 2.0
        }"#;
        let m = TagCooccurrenceMatrix::from_json(json).unwrap();
        assert_eq!(m.cooccurrence("a", "b"), 0.8);
        assert_eq!(m.edge_count("a", "b"), 0);
        assert!(m.compute_pmi("a", "b") != 0.0);
    }

    #[test]
    fn asymmetric_snapshot_is_rejected() {
        let json = r#"{
            "version": 1, "alpha": 0.8, "beta": 0.2,
            "cooccurrence": {"a": {"b": 0.8}},
            "frequencies": {"a": 1.0, "b": 1.0},
            "total_count": 2.0
        }"#;
        let err = TagCooccurrenceMatrix::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            MeshError::TagMatrixError(TagMatrixError::SnapshotCorrupted { .. })
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{"version": 99, "alpha": 0.8, "beta": 0.2}"#;
        let err = TagCooccurrenceMatrix::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            MeshError::TagMatrixError(TagMatrixError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = TagCooccurrenceMatrix::from_json("{").unwrap_err();
        assert!(matches!(err, MeshError::SerializationError(_)));
    }
}
