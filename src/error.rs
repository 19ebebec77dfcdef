use folio_layout::LayoutError;
use folio_render_core::RenderError;
use thiserror::Error;

/// A comprehensive error type for a formatting run.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sequence hand-off failed: {0}")]
    HandOff(String),
}
