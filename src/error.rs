use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestyleError {
    /// A required setting (the API key) is absent. Fatal at startup.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Rejected locally, before any remote call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model answered, but no part of the answer carried image bytes.
    #[error("No image in response")]
    NoImageInResponse,

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("A request is already in flight")]
    RequestInFlight,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RestyleError {
    /// Whether the error came back from (or on the way to) the generation service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            RestyleError::NoImageInResponse | RestyleError::GenerationFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RestyleError>;
