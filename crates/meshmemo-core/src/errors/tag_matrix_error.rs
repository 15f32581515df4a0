/// Tag co-occurrence matrix errors.
#[derive(Debug, thiserror::Error)]
pub enum TagMatrixError {
    #[error("snapshot corrupted: {reason}")]
    SnapshotCorrupted { reason: String },

    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("matrix lock poisoned: {details}")]
    LockPoisoned { details: String },
}
