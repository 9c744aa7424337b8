//! Positional PDF text extraction using lopdf
//!
//! Walks a document's content streams in rendering order and emits text
//! runs, each tagged with its 1-based page number and a bounding box in
//! top-left-origin page coordinates, exported as a flat JSON record list.
//!
//! This crate provides:
//! - `extract` / `extract_from_file` / `extract_from_mem` for positioned
//!   run lists over a page range, in stream or position-sorted order
//! - `PageEvents`, the underlying lazy page-and-run event stream
//! - `serialize_runs`, the JSON export format

pub mod cmap;
pub mod engine;
pub mod export;
pub mod fonts;
pub mod runs;
pub mod traverse;

pub use engine::{
    extract, extract_from_file, extract_from_mem, DocumentMetadata, PageRange, RunOrder,
};
pub use export::serialize_runs;
pub use runs::{record_run, GlyphSample, PageSequencer, TextRun};
pub use traverse::{PageEvent, PageEvents, RunEvent};

use std::path::Path;

/// Extracts a whole file to the JSON export format: every page, position
/// sorted.
pub fn extract_to_json<P: AsRef<Path>>(path: P) -> Result<String, ExtractError> {
    let runs = extract_from_file(path, PageRange::full(), RunOrder::PositionSorted, None)?;
    Ok(serialize_runs(&runs))
}

/// As `extract_to_json`, from an in-memory buffer.
pub fn extract_to_json_mem(buffer: &[u8]) -> Result<String, ExtractError> {
    let runs = extract_from_mem(buffer, PageRange::full(), RunOrder::PositionSorted, None)?;
    Ok(serialize_runs(&runs))
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable PDF: {0}")]
    Unreadable(String),
    #[error("PDF is encrypted")]
    Encrypted,
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Unreadable(e.to_string())
    }
}
