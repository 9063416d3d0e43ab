//! Failures of the two capabilities the sampler drives. Both are transient: the sampler logs
//! them, records them for [status](super::collection::sampler::ActivitySampler::status) and
//! keeps ticking.

/// Capturing a single activity sample failed. The tick contributes nothing.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture command could not be run: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("capture produced no description")]
    Empty,
}

/// Summarizing a full window failed. The window is dropped, not retried.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("summarize command could not be run: {0}")]
    Io(#[from] std::io::Error),
    #[error("samples could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("summarize command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("summarizer returned an empty summary")]
    Empty,
}
