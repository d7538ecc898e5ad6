//! Restyle: photo re-styling on top of Gemini image models.
//!
//! Compose a style prompt with [`prompt::compose_prompt`], then run it against a
//! [`SourceImage`] through [`GeminiClient`], either directly or via an
//! [`EditSession`] that tracks the current image and the request state.

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod prompt;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

pub use config::{Config, GeminiConfig};
pub use error::{RestyleError, Result};
pub use gemini::{GeminiClient, GenerationTransport, HttpTransport, ImageClient};
pub use models::{
    GenerationResult, ImageMime, Influence, InfluenceBand, Operation, PromptParams, Quality,
    SourceImage, StyleOption, STYLE_OPTIONS,
};
pub use prompt::{compose, compose_prompt};
pub use session::{EditSession, RequestState};
