use std::process::ExitStatus;
use thiserror::Error;

/// Failures that abort a run.
///
/// The library returns `anyhow::Result` everywhere; these are the kinds a
/// caller may want to tell apart, recoverable through `downcast_ref`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Frames have different dimensions: {older:?} vs {newer:?}")]
    DimensionMismatch {
        older: (u32, u32),
        newer: (u32, u32),
    },

    #[error("Unexpected probe output (expected WIDTHxHEIGHTxNUM/DEN): {0:?}")]
    MalformedProbe(String),

    #[error("{tool} exited with {status}:\n{stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}
