use std::path::PathBuf;

/// Precondition-fatal errors. Any of these aborts the run before it starts
/// propagating routes; `main` logs the message and exits non-zero.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {path}: {source}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cycle detected in provider/customer graph")]
    CycleDetected,
}

pub type SimResult<T> = Result<T, SimError>;
