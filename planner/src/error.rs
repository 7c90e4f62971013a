use thiserror::Error;

use crate::app::{ParkingError, PoiError};
use crate::config::ConfigError;
use crate::engine::PlanError;
use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("failed to write GPX file: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure the command line front end reports.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Poi(#[from] PoiError),
    #[error(transparent)]
    Parking(#[from] ParkingError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Short sentence for the status line; configuration, transport and
    /// export failures keep their diagnostic text.
    pub fn user_message(&self) -> String {
        match self {
            CliError::Gateway(err) => err.user_message(),
            CliError::Plan(err) => err.user_message(),
            CliError::Poi(err) => err.user_message(),
            CliError::Parking(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
