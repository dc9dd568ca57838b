use serde::Serialize;

use super::color::Color;
use crate::filter::Span;

/// The IR unit — text content + style metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

/// Style for a rendered segment.
///
/// `Default` leaves the color choice to the presentation layer (it depends on
/// the active theme); `Highlight` carries the owning filter's colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentStyle {
    Default,
    Highlight { foreground: Color, background: Color },
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            style: SegmentStyle::Default,
        }
    }

    pub fn foreground(&self) -> Option<Color> {
        match self.style {
            SegmentStyle::Default => None,
            SegmentStyle::Highlight { foreground, .. } => Some(foreground),
        }
    }

    pub fn background(&self) -> Option<Color> {
        match self.style {
            SegmentStyle::Default => None,
            SegmentStyle::Highlight { background, .. } => Some(background),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self.style, SegmentStyle::Highlight { .. })
    }
}

/// Split `text` into default and highlighted segments.
///
/// `spans` must be sorted, non-overlapping and lie on char boundaries of
/// `text`; the engine guarantees this. The result always covers the whole
/// line: concatenating the segment texts gives back `text`.
pub fn build_segments(text: &str, spans: &[Span], highlight: SegmentStyle) -> Vec<Segment> {
    if spans.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for span in spans {
        if span.start > cursor {
            segments.push(Segment::plain(&text[cursor..span.start]));
        }
        segments.push(Segment {
            text: text[span.start..span.end()].to_string(),
            style: highlight,
        });
        cursor = span.end();
    }

    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }

    segments
}
