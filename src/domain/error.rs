// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::domain::types::AssetId;

#[derive(Error, Debug)]
pub enum VacuumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("External API error: {provider} responded with {status}")]
    ApiCall { provider: String, status: u16 },

    #[error("No swap route for {asset}")]
    NoRoute { asset: AssetId },

    #[error("Balance listing failed for {asset}: {reason}")]
    BalanceListing { asset: AssetId, reason: String },

    #[error("Valuation ${value_usd} violates {bound} bound of ${limit}")]
    ValuationOutOfBounds {
        value_usd: f64,
        bound: ValuationBound,
        limit: f64,
    },

    #[error("Nothing to do: no eligible assets in this run")]
    NothingToDo,

    #[error("{burn_count} pending burn(s) require explicit confirmation")]
    ConfirmationRequired { burn_count: usize },

    #[error("Run cancelled before submission")]
    Cancelled,

    #[error("Ledger execution failed ({}): {reason}", digest.as_deref().unwrap_or("no digest"))]
    LedgerExecution {
        digest: Option<String>,
        reason: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

/// Which side of the valuation window a deposit violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationBound {
    Minimum,
    Aggregate,
}

impl std::fmt::Display for ValuationBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationBound::Minimum => write!(f, "per-asset minimum"),
            ValuationBound::Aggregate => write!(f, "run aggregate maximum"),
        }
    }
}

impl From<config::ConfigError> for VacuumError {
    fn from(err: config::ConfigError) -> Self {
        VacuumError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for VacuumError {
    fn from(err: reqwest::Error) -> Self {
        VacuumError::Connection(err.to_string())
    }
}
