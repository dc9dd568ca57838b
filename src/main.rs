mod cli;
mod logging;
mod signal;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use cli::render::LineRenderer;
use cli::Args;
use tabtail::config::{self, Config, ConfigError};
use tabtail::source::{read_lines, spawn_line_source};
use tabtail::tab::FilterTab;
use tabtail::{IngestDispatcher, Session, SessionEvent, TabId};

// Constants
const EVENT_POLL_INTERVAL_MS: u64 = 100;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    // Nothing piped and no file given: show usage instead of waiting on a tty
    if args.file.is_none() && io::stdin().is_terminal() {
        eprintln!("Usage: tabtail [OPTIONS] <FILE>");
        eprintln!("       command | tabtail [OPTIONS]");
        eprintln!("       tabtail [OPTIONS] -  (explicit stdin)");
        std::process::exit(1);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // Cargo-style message already ends with a newline
            eprint!("{}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(config.session_options());
    cli::setup_tabs(&mut session, &args)?;
    let renderer = LineRenderer::new(config.theme, args.json);

    match &args.file {
        Some(path) if !args.is_live() => run_file(session, path, &args, &renderer),
        _ => run_live(session, &config, &args, &renderer),
    }
}

/// Explicit `--config` file, or discovered project/global config, with CLI
/// overrides applied.
fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_single_file(path)?,
        None => {
            let (discovery, searched) = config::discover_verbose();
            tracing::debug!(
                found = discovery.has_config(),
                searched = searched.len(),
                project = ?discovery.project_config,
                global = ?discovery.global_config,
                "config discovery finished"
            );
            config::load(&discovery)?
        }
    };

    if let Some(capacity) = args.capacity {
        config.capacity = capacity.max(1);
    }
    Ok(config)
}

/// Bulk load a file and print the resulting tab output.
fn run_file(mut session: Session, path: &Path, args: &Args, renderer: &LineRenderer) -> Result<()> {
    let lines = read_lines(path)?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    session.bulk_load(lines, &label);

    let tabs: Vec<&FilterTab> = if args.all {
        session.tabs().iter().collect()
    } else {
        session.selected_tab().into_iter().collect()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for tab in tabs {
        if args.all {
            if let Some(header) = renderer.header(tab) {
                writeln!(out, "{}", header)?;
            }
        }
        for line in tab.lines().iter() {
            writeln!(out, "{}", renderer.render(tab.id(), tab.name(), line)?)?;
        }
    }
    out.flush()?;

    print_summary(&session);
    Ok(())
}

/// Stream stdin through the dispatcher until EOF or Ctrl+C.
fn run_live(session: Session, config: &Config, args: &Args, renderer: &LineRenderer) -> Result<()> {
    let shutdown = signal::setup_shutdown_handlers().context("Failed to install signal handlers")?;

    let dispatcher = IngestDispatcher::spawn(session);
    let handle = dispatcher.handle();
    let events = handle.subscribe()?;
    let (selected, names) = handle.with_session(|session| {
        let names: HashMap<TabId, String> = session
            .tabs()
            .iter()
            .map(|tab| (tab.id(), tab.name().to_string()))
            .collect();
        (session.selected(), names)
    })?;
    let printer = EventPrinter {
        renderer,
        names,
        selected,
        all: args.all,
    };

    let reader = spawn_line_source(io::stdin(), config.framer(), handle.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("interrupted, stopping");
            break;
        }

        match events.recv_timeout(Duration::from_millis(EVENT_POLL_INTERVAL_MS)) {
            Ok(event) => printer.print(&mut out, event)?,
            Err(RecvTimeoutError::Timeout) => {
                if reader.is_finished() {
                    // Round trip so every line the reader posted has been ingested
                    handle.stats()?;
                    for event in events.try_iter() {
                        printer.print(&mut out, event)?;
                    }
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    out.flush()?;

    let session = dispatcher.shutdown()?;
    print_summary(&session);
    Ok(())
}

struct EventPrinter<'a> {
    renderer: &'a LineRenderer,
    names: HashMap<TabId, String>,
    selected: Option<TabId>,
    all: bool,
}

impl EventPrinter<'_> {
    fn print(&self, out: &mut impl Write, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::LineAppended { tab, line } if self.all || Some(tab) == self.selected => {
                let name = self.names.get(&tab).map(String::as_str).unwrap_or_default();
                writeln!(out, "{}", self.renderer.render(tab, name, &line)?)?;
            }
            SessionEvent::Status(message) => eprintln!("{}", message),
            _ => {}
        }
        Ok(())
    }
}

fn print_summary(session: &Session) {
    if !session.status().is_empty() {
        eprintln!("{}", session.status());
    }
    eprintln!("{}", session.stats());
}
