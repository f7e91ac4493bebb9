/// Why a refresh cycle produced no new match list.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    /// The request never produced a response, or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        source: ureq::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The body was not JSON, or not the expected shape.
    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("the feed returned no matches")]
    Empty,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("unknown timezone {0:?}")]
    InvalidTimezone(String),
}
