//! Terminal output for rendered lines: ANSI colors or JSON.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use tabtail::config::Theme;
use tabtail::renderer::{Color, RenderedLine, SegmentStyle};
use tabtail::tab::FilterTab;
use tabtail::TabId;

#[derive(Serialize)]
struct JsonLine<'a> {
    tab: TabId,
    name: &'a str,
    highlights: usize,
    #[serde(flatten)]
    line: &'a RenderedLine,
}

pub struct LineRenderer {
    theme: Theme,
    json: bool,
}

impl LineRenderer {
    pub fn new(theme: Theme, json: bool) -> Self {
        Self { theme, json }
    }

    /// One output line for `line`, produced by tab `tab`.
    pub fn render(&self, tab: TabId, tab_name: &str, line: &RenderedLine) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string(&JsonLine {
                tab,
                name: tab_name,
                highlights: line.highlight_count(),
                line,
            })?);
        }

        let base = self.theme.base_foreground();
        Ok(line
            .segments
            .iter()
            .map(|segment| match segment.style {
                SegmentStyle::Default => paint(&segment.text, base, Color::Transparent),
                SegmentStyle::Highlight {
                    foreground,
                    background,
                } => paint(&segment.text, foreground, background),
            })
            .map(|s| s.to_string())
            .collect())
    }

    /// Separator printed before a tab's lines with `--all`. None in JSON mode.
    pub fn header(&self, tab: &FilterTab) -> Option<String> {
        if self.json {
            return None;
        }
        Some(format!("==> {} <==", tab.rule().description()).bold().to_string())
    }
}

fn paint(text: &str, foreground: Color, background: Color) -> ColoredString {
    let mut styled = text.normal();
    if let Some((r, g, b)) = foreground.rgb() {
        styled = styled.truecolor(r, g, b);
    }
    if let Some((r, g, b)) = background.rgb() {
        styled = styled.on_truecolor(r, g, b);
    }
    styled
}
