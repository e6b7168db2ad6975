use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading store file {path} failed")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing store file {path} failed")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding store value failed")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("city not found: {0}")]
    CityNotFound(String),
    #[error("forecast request failed")]
    Request(#[from] reqwest::Error),
    #[error("malformed forecast payload: {0}")]
    Malformed(&'static str),
}
