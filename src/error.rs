//! Application error taxonomy.
//!
//! Every failure in the load pipeline is classified into one of these
//! kinds. The enum tag alone decides the banner text via
//! [`AppError::user_message`]; the `Display` detail is for logs only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Credential fetch failed: {0}")]
    DataFetch(String),

    #[error("Map initialization failed: {0}")]
    MapInitialization(String),

    #[error("Accident fetch failed: {0}")]
    FetchAccidents(String),

    #[error("Marker rendering failed: {0}")]
    Marker(String),

    #[error("Unexpected payload shape: {0}")]
    Format(String),

    #[error("Unexpected error: {0}")]
    Unexpected(#[source] anyhow::Error),
}

impl AppError {
    /// Wrap an error that fits none of the named kinds.
    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        AppError::Unexpected(err.into())
    }

    /// The fixed message shown in the error banner for this kind.
    ///
    /// Kinds outside the six named ones fall through to the generic
    /// message.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(_) => "Network issue, please try again later.",
            AppError::DataFetch(_) => "Problem fetching data.",
            AppError::MapInitialization(_) => "Failed to initialize the map.",
            AppError::FetchAccidents(_) => "Could not load accident data.",
            AppError::Marker(_) => "Error displaying map markers",
            AppError::Format(_) => "Fetched data is not in expected format",
            AppError::Unexpected(_) => "An unexpected error occurred.",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
