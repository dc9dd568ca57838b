//! Command-line interface for tabtail.

pub mod render;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use tabtail::filter::engine::MatchEngine;
use tabtail::renderer::Color;
use tabtail::{FilterMode, FilterRule, RuleSettings, Session, TabId};

#[derive(Parser, Debug)]
#[command(name = "tabtail")]
#[command(about = "Tail a line stream through live filter tabs with highlighting", long_about = None)]
pub struct Args {
    /// Log file to load (omit or use - to read live from stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Add a plain-text filter tab (repeatable)
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub expressions: Vec<String>,

    /// Add a regex filter tab (repeatable)
    #[arg(short = 'r', long = "regex", value_name = "REGEX")]
    pub regexes: Vec<String>,

    /// Case-sensitive matching (default: case-insensitive)
    #[arg(long)]
    pub match_case: bool,

    /// Highlight foreground (name or #rrggbb); defaults to the tab's palette color
    #[arg(long, value_name = "COLOR")]
    pub fg: Option<Color>,

    /// Highlight background (name or #rrggbb)
    #[arg(long, value_name = "COLOR")]
    pub bg: Option<Color>,

    /// Tab to print, 1-based (default: the last one added)
    #[arg(long, value_name = "N")]
    pub select: Option<usize>,

    /// Print every tab instead of only the selected one
    #[arg(long, conflicts_with = "select")]
    pub all: bool,

    /// Print rendered lines as JSON objects
    #[arg(long)]
    pub json: bool,

    /// Lines kept in history and in each tab (overrides config)
    #[arg(long, value_name = "N")]
    pub capacity: Option<usize>,

    /// Config file to use instead of discovering tabtail.yaml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Whether input comes from stdin rather than a file.
    pub fn is_live(&self) -> bool {
        self.file
            .as_ref()
            .map_or(true, |path| path.as_os_str() == "-")
    }

    /// Expression and mode of every requested tab: `-e` tabs first, then `-r`.
    fn filter_specs(&self) -> Vec<(&str, FilterMode)> {
        let plain = self
            .expressions
            .iter()
            .map(|e| (e.as_str(), FilterMode::from_flags(false, self.match_case)));
        let regex = self
            .regexes
            .iter()
            .map(|r| (r.as_str(), FilterMode::from_flags(true, self.match_case)));
        plain.chain(regex).collect()
    }
}

/// Create the requested tabs in `session` and apply `--select`.
///
/// Patterns are checked before any line arrives so that a typo fails the run
/// instead of silently producing an empty tab.
pub fn setup_tabs(session: &mut Session, args: &Args) -> Result<Vec<TabId>> {
    let specs = args.filter_specs();
    if specs.is_empty() {
        return Ok(vec![session.add_tab()]);
    }

    let mut ids = Vec::with_capacity(specs.len());
    for (expression, mode) in specs {
        let id = session.add_tab();
        let default_fg = session
            .tab(id)
            .map_or(Color::Red, |tab| tab.rule().settings.foreground);
        let settings = RuleSettings::new(expression, mode).with_colors(
            args.fg.unwrap_or(default_fg),
            args.bg.unwrap_or(Color::Transparent),
        );

        MatchEngine::compile(&FilterRule::new(id.to_string(), settings.clone()))
            .with_context(|| format!("invalid filter expression '{}'", expression))?;
        session.configure_tab(id, settings)?;
        ids.push(id);
    }

    if let Some(n) = args.select {
        let Some(&id) = n.checked_sub(1).and_then(|i| ids.get(i)) else {
            bail!("--select {} is out of range (1..={})", n, ids.len());
        };
        session.select_tab(id)?;
    }

    Ok(ids)
}
