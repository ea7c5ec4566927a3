use thiserror::Error;

/// Why an OSRM lookup produced no usable answer.
#[derive(Debug, Error)]
pub enum OsrmError {
    #[cfg(feature = "osrm")]
    #[error("OSRM request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OSRM returned HTTP {0}")]
    Status(u16),
    #[error("OSRM returned code {0}")]
    Api(String),
    #[error("OSRM response could not be decoded: {0}")]
    Json(#[from] serde_json::Error),
    #[error("OSRM response has no routes")]
    NoRoute,
    #[error("OSRM response is malformed: {0}")]
    Malformed(&'static str),
    #[error("invalid OSRM URL: {0}")]
    Url(String),
}
