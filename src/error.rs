use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Ingredient;

/// Errors surfaced to callers of the shopping pipeline
#[derive(Error, Debug)]
pub enum ShopperError {
    /// Every extraction stage failed for this page
    #[error("No recipe found at {url}")]
    NoRecipeFound { url: String },

    /// The page could not be fetched
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// A completion provider could not be created
    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// An ingredient line whose quantity could not be evaluated.
///
/// The line is never lost: `ingredient` holds everything that could still be
/// extracted (unit, name, notes) with an empty amount.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid quantity in \"{original}\": {reason}")]
pub struct ParseError {
    pub original: String,
    pub reason: String,
    pub ingredient: Ingredient,
}

impl ParseError {
    pub fn into_ingredient(self) -> Ingredient {
        self.ingredient
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot convert from {from} to {to}")]
pub struct ConversionError {
    pub from: String,
    pub to: String,
}

/// Failure of a single store lookup
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store did not answer in time")]
    Timeout,

    #[error("Store responded with status {0}")]
    Status(u16),

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Unsupported store: {0}")]
    Unsupported(String),
}

impl StoreError {
    /// Sort a transport failure, keeping timeouts apart from other errors
    pub fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Request(error)
        }
    }
}

/// A store that contributed no candidates, kept next to the results for
/// observability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQueryFailure {
    pub store: String,
    pub query: String,
    pub message: String,
}
