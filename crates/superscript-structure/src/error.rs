use superscript_core::DocumentError;
use thiserror::Error;

/// Errors raised while restyling a document or loading configuration.
#[derive(Debug, Error)]
pub enum StructureError {
    /// The host document rejected a patch or selection.
    #[error("document rejected edit: {0}")]
    Document(#[from] DocumentError),

    /// Configuration could not be parsed.
    #[error("invalid restyle configuration: {0}")]
    Config(#[from] toml::de::Error),
}
