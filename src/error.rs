use thiserror::Error;

use crate::pipeline::Stage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn on_key(key: &Option<String>) -> String {
    match key {
        Some(k) => format!(" (while accessing key `{k}`)"),
        None => String::new(),
    }
}

/// Failure talking to the remote search/fetch service.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Response(String),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("search term must not be empty")]
    EmptyQuery,

    #[error("max results must be between 1 and {limit}, got {value}")]
    InvalidMaxResults { value: usize, limit: usize },

    #[error("search for `{term}` failed")]
    Search {
        term: String,
        #[source]
        source: RemoteError,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("batch fetch of {count} identifiers failed")]
    Request {
        count: usize,
        #[source]
        source: RemoteError,
    },

    #[error("malformed payload in record {record}: {reason}")]
    Malformed { record: usize, reason: String },

    #[error(
        "incomplete batch: requested {expected} records but {parsed} were returned
suggestion: the service may have dropped duplicate or unknown identifiers; try a smaller --batch-size"
    )]
    Incomplete { expected: usize, parsed: usize },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend {backend} is unavailable{}", on_key(.key))]
    Unavailable {
        backend: String,
        /// The key being read or written, `None` when the connection itself failed
        key: Option<String>,
        #[source]
        source: BoxError,
    },

    #[error("cache backend rejected key `{key}`")]
    Backend {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("could not serialize record `{key}`")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record at position {position} has an empty identifier and cannot be cached")]
    EmptyKey { position: usize },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("identifier `{id}` is not in the cache")]
    Miss { id: String },

    #[error("cache entry for `{id}` is corrupt")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("could not write report to {path}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The error of whichever stage failed.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("this pipeline has already run")]
    AlreadyRan,
}

#[derive(Error, Debug)]
#[error("pipeline failed while {stage}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}
