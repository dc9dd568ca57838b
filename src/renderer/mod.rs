//! Rendered (segmented) lines produced by filter tabs.
//!
//! The core never paints anything; it hands presentation layers a plain value
//! per line: the formatted text plus the styled segments covering it.

pub mod color;
pub mod segment;

use serde::Serialize;

use crate::filter::Span;
pub use color::Color;
pub use segment::{build_segments, Segment, SegmentStyle};

/// A formatted line split into styled segments.
///
/// Concatenating `segments` reproduces `text` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    pub text: String,
    pub segments: Vec<Segment>,
}

impl RenderedLine {
    /// Build a rendered line from `text` and sorted, non-overlapping spans.
    pub fn new(text: String, spans: &[Span], highlight: SegmentStyle) -> Self {
        let segments = build_segments(&text, spans, highlight);
        Self { text, segments }
    }

    /// Number of highlighted segments in the line.
    pub fn highlight_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_highlighted()).count()
    }
}
