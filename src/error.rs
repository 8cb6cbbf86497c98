use thiserror::Error;

/// Errors raised while fetching a status envelope.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("status endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode status envelope: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PollError {
    /// Whether the poller should try again after this error.
    ///
    /// Network and HTTP-level failures are retried; an envelope that does not
    /// parse will not get better on the next request.
    pub fn is_transient(&self) -> bool {
        !matches!(self, PollError::Decode(_))
    }
}

/// A status envelope that parsed as JSON but does not match the shape its
/// status requires.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("PROGRESS result is missing numeric `{0}`")]
    MissingProgressField(&'static str),

    #[error("SUCCESS result has no rows")]
    MissingRows,

    #[error("SUCCESS result row {0} is not a list of cells within the header width")]
    InvalidRow(usize),

    #[error("SUCCESS result is not an object")]
    InvalidTaskResult,

    #[error("SUCCESS result has neither `error` nor `s3_path`")]
    MissingReference,
}

pub type Result<T> = std::result::Result<T, PollError>;
