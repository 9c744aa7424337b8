//! Extraction orchestration: page ranges, run ordering, and the fold from
//! traversal events into the final run list.

use std::path::Path;

use lopdf::Document;

use crate::runs::{record_run, PageSequencer, TextRun};
use crate::traverse::{PageEvent, PageEvents};
use crate::ExtractError;

/// 1-based inclusive page range. `end` of `None` means the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    /// The whole document.
    pub fn full() -> Self {
        PageRange {
            start: 1,
            end: None,
        }
    }

    /// A bounded range.
    pub fn new(start: u32, end: u32) -> Self {
        PageRange {
            start,
            end: Some(end),
        }
    }

    /// Clamps against a document's page count. Out-of-bounds requests are
    /// advisory, not errors: `0..=999` on five pages behaves as `1..=5`.
    /// An inverted result selects nothing.
    pub(crate) fn clamp(&self, total_pages: u32) -> (u32, u32) {
        let start = self.start.max(1);
        let end = self.end.unwrap_or(total_pages).min(total_pages);
        (start, end)
    }
}

impl Default for PageRange {
    fn default() -> Self {
        PageRange::full()
    }
}

/// Order in which runs are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOrder {
    /// Rendering order, exactly as the content stream emits.
    Stream,
    /// Per page, top-down then left-to-right.
    #[default]
    PositionSorted,
}

/// Document facts the extraction reports back to the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Total pages in the document, filled once per successful extraction.
    pub page_count: Option<u32>,
}

/// Extracts positioned text runs from an already-loaded document.
///
/// All-or-nothing: any traversal failure aborts the whole call with no
/// partial results. On success the optional metadata sink receives the
/// document's total page count. The caller keeps ownership of `doc`;
/// concurrent extractions of different documents are independent.
pub fn extract(
    doc: &Document,
    range: PageRange,
    order: RunOrder,
    metadata: Option<&mut DocumentMetadata>,
) -> Result<Vec<TextRun>, ExtractError> {
    extract_with_raw(doc, None, range, order, metadata)
}

/// Extracts from a file on disk. The document handle is scoped to the call
/// and released on every exit path.
pub fn extract_from_file<P: AsRef<Path>>(
    path: P,
    range: PageRange,
    order: RunOrder,
    metadata: Option<&mut DocumentMetadata>,
) -> Result<Vec<TextRun>, ExtractError> {
    let bytes = std::fs::read(path)?;
    extract_from_mem(&bytes, range, order, metadata)
}

/// Extracts from an in-memory buffer.
pub fn extract_from_mem(
    buffer: &[u8],
    range: PageRange,
    order: RunOrder,
    metadata: Option<&mut DocumentMetadata>,
) -> Result<Vec<TextRun>, ExtractError> {
    let doc = Document::load_mem(buffer)?;
    extract_with_raw(&doc, Some(buffer), range, order, metadata)
}

/// Core fold. `raw_pdf` carries the original file bytes when the caller
/// has them, enabling stream recovery on damaged files.
pub(crate) fn extract_with_raw(
    doc: &Document,
    raw_pdf: Option<&[u8]>,
    range: PageRange,
    order: RunOrder,
    metadata: Option<&mut DocumentMetadata>,
) -> Result<Vec<TextRun>, ExtractError> {
    if doc.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    let events = PageEvents::new(doc, range, order, raw_pdf);
    let mut sequencer = PageSequencer::new(events.first_page());
    let total_pages = events.total_pages();

    let mut runs = Vec::new();
    for event in events {
        match event? {
            PageEvent::PageStart => {
                sequencer.advance();
            }
            PageEvent::Run(run) => {
                if let Some(run) = record_run(sequencer.current(), &run.text, &run.glyphs) {
                    runs.push(run);
                }
            }
        }
    }

    // Written once, only after the whole traversal has succeeded.
    if let Some(metadata) = metadata {
        metadata.page_count = Some(total_pages);
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_out_of_bounds() {
        let range = PageRange::new(0, 999);
        assert_eq!(range.clamp(5), (1, 5));
    }

    #[test]
    fn test_clamp_full_range() {
        assert_eq!(PageRange::full().clamp(3), (1, 3));
        assert_eq!(PageRange::full().clamp(0), (1, 0));
    }

    #[test]
    fn test_clamp_interior_range_untouched() {
        assert_eq!(PageRange::new(2, 4).clamp(5), (2, 4));
        assert_eq!(PageRange::new(2, 2).clamp(5), (2, 2));
    }

    #[test]
    fn test_clamp_inverted_selects_nothing() {
        let (start, end) = PageRange::new(7, 9).clamp(5);
        assert!(start > end);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PageRange::default(), PageRange::full());
        assert_eq!(RunOrder::default(), RunOrder::PositionSorted);
        assert_eq!(DocumentMetadata::default().page_count, None);
    }
}
