use std::fmt;

use thiserror::Error;

/// Terminal failure of a generation request.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input handed to the content builder. Raised before layout starts.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// The measurement provider could not size a fragment.
    #[error("measurement failed: {0}")]
    Measurement(String),

    /// The PDF writer rejected an operation.
    #[error("render failed: {0}")]
    Render(String),

    #[error("generation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report input that could not be decoded (CLI only).
    #[error("invalid input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal diagnostic collected during layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A block (or a table header plus one row) taller than the usable page
    /// height was placed alone on its own page.
    ContentOverflow {
        block_index: usize,
        page_index: usize,
        height: f32,
        available: f32,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ContentOverflow {
                block_index,
                page_index,
                height,
                available,
            } => write!(
                f,
                "block {block_index} on page {} overflows: {height:.1}pt in {available:.1}pt",
                page_index + 1
            ),
        }
    }
}
