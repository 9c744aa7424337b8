//! Text run recording: per-glyph position samples aggregated into per-run
//! bounding boxes, and the page counter that tags runs with page numbers.

/// Position sample for a single glyph, in top-left-origin page coordinates.
///
/// `x`/`y` locate the glyph's baseline origin, `width` is its horizontal
/// advance and `height` the effective (matrix-scaled) font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSample {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A contiguous run of text with its page number and bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub page: u32,
}

/// Aggregates one run's glyph samples into a single `TextRun`.
///
/// The box spans from the first sample's origin to the end of the last
/// sample: `width` is the last glyph's far edge minus the first glyph's
/// origin, so inner glyph positions never widen the box. `height` is taken
/// from the first sample alone; a run that changes size mid-way keeps the
/// leading glyph's height. Returns `None` when there are no samples.
pub fn record_run(page: u32, text: &str, samples: &[GlyphSample]) -> Option<TextRun> {
    let first = samples.first()?;
    let last = samples.last()?;
    Some(TextRun {
        text: text.to_string(),
        x: first.x,
        y: first.y,
        width: (last.x + last.width) - first.x,
        height: first.height,
        page,
    })
}

/// Counts page-start events so runs can be tagged with 1-based page numbers.
///
/// Seeded with the first page number the traversal will visit; each
/// page-start advances the counter by one. Runs are tagged with whatever
/// count is in effect when they are recorded.
#[derive(Debug)]
pub struct PageSequencer {
    current: u32,
}

impl PageSequencer {
    pub fn new(first_page: u32) -> Self {
        PageSequencer {
            current: first_page.saturating_sub(1),
        }
    }

    /// Advances to the next page and returns its number.
    pub fn advance(&mut self) -> u32 {
        self.current += 1;
        self.current
    }

    /// Page number runs are currently tagged with.
    pub fn current(&self) -> u32 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, width: f32) -> GlyphSample {
        GlyphSample {
            x,
            y: 20.0,
            width,
            height: 12.0,
        }
    }

    #[test]
    fn test_record_run_spans_first_to_last() {
        let samples = vec![sample(10.0, 10.0), sample(20.0, 10.0), sample(30.0, 10.0)];
        let run = record_run(1, "abc", &samples).unwrap();
        assert_eq!(run.x, 10.0);
        assert_eq!(run.y, 20.0);
        assert_eq!(run.width, 30.0);
        assert_eq!(run.height, 12.0);
        assert_eq!(run.page, 1);
        assert_eq!(run.text, "abc");
    }

    #[test]
    fn test_record_run_single_sample() {
        let run = record_run(3, "x", &[sample(100.0, 6.5)]).unwrap();
        assert_eq!(run.x, 100.0);
        assert_eq!(run.width, 6.5);
        assert_eq!(run.page, 3);
    }

    #[test]
    fn test_record_run_height_from_first_sample() {
        // Mixed-size run: the box keeps the leading glyph's height.
        let samples = vec![
            GlyphSample {
                x: 0.0,
                y: 50.0,
                width: 10.0,
                height: 12.0,
            },
            GlyphSample {
                x: 10.0,
                y: 50.0,
                width: 20.0,
                height: 24.0,
            },
        ];
        let run = record_run(1, "aB", &samples).unwrap();
        assert_eq!(run.height, 12.0);
        assert_eq!(run.width, 30.0);
    }

    #[test]
    fn test_record_run_empty_samples() {
        assert!(record_run(1, "", &[]).is_none());
        // Text without samples is still a no-op.
        assert!(record_run(1, "ghost", &[]).is_none());
    }

    #[test]
    fn test_record_run_width_never_negative_for_ltr() {
        // Left-to-right samples with non-negative advances.
        let samples = vec![sample(5.0, 0.0), sample(5.0, 4.0)];
        let run = record_run(1, "ab", &samples).unwrap();
        assert!(run.width >= 0.0);
    }

    #[test]
    fn test_sequencer_counts_from_seed() {
        let mut seq = PageSequencer::new(1);
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.advance(), 1);
        assert_eq!(seq.advance(), 2);
        assert_eq!(seq.current(), 2);
    }

    #[test]
    fn test_sequencer_ranged_seed() {
        // A traversal clamped to start at page 4 tags its first page as 4.
        let mut seq = PageSequencer::new(4);
        assert_eq!(seq.advance(), 4);
        assert_eq!(seq.advance(), 5);
    }
}
