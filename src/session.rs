//! Session state: the history, the raw view and every filter tab.
//!
//! A [`Session`] is the single owner of all mutable state. Every operation
//! takes `&mut self`, so whoever holds it (usually the dispatcher thread)
//! serializes ingestion, rebuilds, clears and tab changes by construction.
//! Presentation code reads through queries, snapshots or subscribed
//! [`SessionEvent`]s.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use crate::buffer::{BoundedBuffer, DEFAULT_CAPACITY};
use crate::error::{InvalidPattern, SessionError};
use crate::event::SessionEvent;
use crate::filter::{FilterRule, RuleSettings};
use crate::history::{is_valid_timestamp_format, HistoryBuffer, LogEntry, DEFAULT_TIMESTAMP_FORMAT};
use crate::renderer::RenderedLine;
use crate::stats::{group_thousands, Stats, StatsAggregator};
use crate::tab::{FilterTab, RebuildReport, TabId};

/// Source label while lines arrive from a live source.
pub const LIVE_SOURCE_LABEL: &str = "Live";

/// Source label for a bulk load without a usable name.
const UNNAMED_FILE_LABEL: &str = "Loaded File";

/// Events queued per subscriber before further events are dropped for it.
pub const SUBSCRIBER_QUEUE_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Capacity of the history, the raw view and each tab's output
    pub capacity: usize,
    /// strftime pattern for the timestamp prefix
    pub timestamp_format: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Immutable copy of one tab, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub rule: FilterRule,
    pub lines: Vec<RenderedLine>,
}

/// Immutable copy of the whole session, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub source: String,
    pub raw_text: String,
    pub tabs: Vec<TabSnapshot>,
    pub selected: Option<TabId>,
    pub paused: bool,
    pub status: String,
    pub stats: Stats,
}

pub struct Session {
    options: SessionOptions,
    history: HistoryBuffer,
    /// Formatted lines shown in the raw view
    raw: BoundedBuffer<String>,
    tabs: Vec<FilterTab>,
    selected: Option<TabId>,
    /// Next tab number; never reused
    next_tab: u64,
    paused: bool,
    total_ingested: u64,
    /// Set for the duration of a bulk load; defers stats and per-line events
    bulk_loading: bool,
    status: String,
    source_label: String,
    stats: Stats,
    subscribers: Vec<SyncSender<SessionEvent>>,
}

impl Session {
    /// Create an empty session. An invalid `timestamp_format` is replaced by
    /// [`DEFAULT_TIMESTAMP_FORMAT`].
    pub fn new(mut options: SessionOptions) -> Self {
        options.capacity = options.capacity.max(1);
        if !is_valid_timestamp_format(&options.timestamp_format) {
            tracing::warn!(
                format = %options.timestamp_format,
                fallback = DEFAULT_TIMESTAMP_FORMAT,
                "invalid timestamp format, using default"
            );
            options.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }
        let capacity = options.capacity;
        Self {
            options,
            history: HistoryBuffer::new(capacity),
            raw: BoundedBuffer::new(capacity),
            tabs: Vec::new(),
            selected: None,
            next_tab: 1,
            paused: false,
            total_ingested: 0,
            bulk_loading: false,
            status: String::new(),
            source_label: LIVE_SOURCE_LABEL.to_string(),
            stats: Stats::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Register a new observer. Dropping the receiver unsubscribes it.
    ///
    /// Each subscriber gets a queue of [`SUBSCRIBER_QUEUE_LEN`] events. While
    /// that queue is full, new events for this subscriber are dropped; the
    /// session never blocks on a slow reader.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::sync_channel(SUBSCRIBER_QUEUE_LEN);
        self.subscribers.push(tx);
        rx
    }

    // --- Ingestion ---

    /// Ingest one live line.
    ///
    /// Dropped entirely while paused; returns whether the line was kept.
    pub fn ingest(&mut self, text: impl Into<String>, timestamp: DateTime<Local>) -> bool {
        if self.paused {
            tracing::trace!("session paused, dropping line");
            return false;
        }

        if !self.bulk_loading && self.source_label != LIVE_SOURCE_LABEL {
            self.source_label = LIVE_SOURCE_LABEL.to_string();
        }
        self.append_entry(LogEntry::new(timestamp, text));
        if !self.bulk_loading {
            self.refresh_stats();
        }
        true
    }

    /// Replace the session contents with `lines`, ingested in order.
    ///
    /// Runs regardless of pause. Per-line events and stats are deferred: at
    /// the end one `BulkLoaded`, one `TabRebuilt` per tab and one stats
    /// update are emitted. Returns the number of lines loaded.
    pub fn bulk_load<I, S>(&mut self, lines: I, label: &str) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reset_buffers();
        self.emit(SessionEvent::Cleared);

        let label = if label.trim().is_empty() {
            UNNAMED_FILE_LABEL
        } else {
            label
        };
        self.source_label = label.to_string();

        self.bulk_loading = true;
        let mut loaded = 0usize;
        for line in lines {
            self.append_entry(LogEntry::new(Local::now(), line));
            loaded += 1;
        }
        self.bulk_loading = false;

        tracing::debug!(
            lines = loaded,
            evicted = self.history.evicted(),
            source = %label,
            "bulk load finished"
        );

        self.emit(SessionEvent::BulkLoaded { lines: loaded });
        let ids: Vec<TabId> = self.tabs.iter().map(FilterTab::id).collect();
        for tab in ids {
            self.emit(SessionEvent::TabRebuilt { tab });
        }
        let message = format!("Loaded {} lines from {}", group_thousands(loaded as u64), label);
        self.set_status(message);
        self.refresh_stats();
        loaded
    }

    /// Drop all history, raw lines, tab output and the ingest counter.
    pub fn clear(&mut self) {
        self.reset_buffers();
        self.emit(SessionEvent::Cleared);
        self.refresh_stats();
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.emit(SessionEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.emit(SessionEvent::Resumed);
        }
    }

    /// Surface a transport problem on the status channel. Ingestion carries on.
    pub fn report_transport_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(error = %message, "transport error");
        self.set_status(message);
    }

    // --- Tabs ---

    /// Create a tab with default name and colors, select it and build its
    /// output from the current history.
    pub fn add_tab(&mut self) -> TabId {
        let n = self.next_tab;
        self.next_tab += 1;

        let tab = FilterTab::new(n, self.options.capacity);
        let id = tab.id();
        self.tabs.push(tab);
        self.emit(SessionEvent::TabAdded { tab: id });

        self.selected = Some(id);
        self.emit(SessionEvent::SelectionChanged { tab: Some(id) });

        self.rebuild_at(self.tabs.len() - 1);
        id
    }

    /// Remove a tab. Selection moves to the last remaining tab, if any.
    pub fn remove_tab(&mut self, id: TabId) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        self.tabs.remove(index);
        self.emit(SessionEvent::TabRemoved { tab: id });

        let selected = self.tabs.last().map(FilterTab::id);
        if selected != self.selected {
            self.selected = selected;
            self.emit(SessionEvent::SelectionChanged { tab: selected });
        }
        self.refresh_stats();
        Ok(())
    }

    /// Replace a tab's expression, mode and colors, then rebuild it.
    pub fn configure_tab(
        &mut self,
        id: TabId,
        settings: RuleSettings,
    ) -> Result<RebuildReport, SessionError> {
        let index = self.index_of(id)?;
        self.tabs[index].configure(settings);
        Ok(self.rebuild_at(index))
    }

    /// Rename a tab. Renaming counts as a reconfiguration and rebuilds it.
    pub fn rename_tab(
        &mut self,
        id: TabId,
        name: impl Into<String>,
    ) -> Result<RebuildReport, SessionError> {
        let index = self.index_of(id)?;
        self.tabs[index].rename(name);
        Ok(self.rebuild_at(index))
    }

    pub fn select_tab(&mut self, id: TabId) -> Result<(), SessionError> {
        self.index_of(id)?;
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.emit(SessionEvent::SelectionChanged { tab: Some(id) });
            self.refresh_stats();
        }
        Ok(())
    }

    pub fn rebuild_tab(&mut self, id: TabId) -> Result<RebuildReport, SessionError> {
        let index = self.index_of(id)?;
        Ok(self.rebuild_at(index))
    }

    /// Rebuild every tab, in tab order.
    pub fn rebuild_all(&mut self) -> Vec<(TabId, RebuildReport)> {
        (0..self.tabs.len())
            .map(|index| (self.tabs[index].id(), self.rebuild_at(index)))
            .collect()
    }

    // --- Queries ---

    pub fn tabs(&self) -> &[FilterTab] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&FilterTab> {
        self.tabs.iter().find(|tab| tab.id() == id)
    }

    /// Ordered output of one tab.
    pub fn tab_lines(&self, id: TabId) -> Result<&BoundedBuffer<RenderedLine>, SessionError> {
        self.tab(id)
            .map(FilterTab::lines)
            .ok_or(SessionError::UnknownTab(id))
    }

    pub fn selected(&self) -> Option<TabId> {
        self.selected
    }

    pub fn selected_tab(&self) -> Option<&FilterTab> {
        self.selected.and_then(|id| self.tab(id))
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Raw view: formatted history lines joined with `\n`.
    pub fn raw_text(&self) -> String {
        let mut text = String::new();
        for (i, line) in self.raw.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line);
        }
        text
    }

    pub fn raw_line_count(&self) -> usize {
        self.raw.len()
    }

    pub fn total_ingested(&self) -> u64 {
        self.total_ingested
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Last message posted on the status channel.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// `"Live"` for live input, otherwise the name given to the last bulk load.
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.source_label.clone(),
            raw_text: self.raw_text(),
            tabs: self
                .tabs
                .iter()
                .map(|tab| TabSnapshot {
                    id: tab.id(),
                    rule: tab.rule().clone(),
                    lines: tab.lines().iter().cloned().collect(),
                })
                .collect(),
            selected: self.selected,
            paused: self.paused,
            status: self.status.clone(),
            stats: self.stats,
        }
    }

    // --- Internals ---

    fn index_of(&self, id: TabId) -> Result<usize, SessionError> {
        self.tabs
            .iter()
            .position(|tab| tab.id() == id)
            .ok_or(SessionError::UnknownTab(id))
    }

    fn reset_buffers(&mut self) {
        self.history.clear();
        self.raw.clear();
        for tab in &mut self.tabs {
            tab.clear();
        }
        self.total_ingested = 0;
    }

    /// Append to history and raw view, then offer the line to every tab.
    fn append_entry(&mut self, entry: LogEntry) {
        let formatted = entry.format(&self.options.timestamp_format);
        self.total_ingested += 1;
        self.history.push(entry);
        self.raw.push(formatted.line.clone());

        let notify = !self.bulk_loading && !self.subscribers.is_empty();
        let mut events = Vec::new();
        let mut failures = Vec::new();
        if notify {
            events.push(SessionEvent::RawLineAppended {
                line: formatted.line.clone(),
            });
        }

        for tab in &mut self.tabs {
            let id = tab.id();
            match tab.offer(&formatted) {
                Ok(Some(line)) if notify => events.push(SessionEvent::LineAppended {
                    tab: id,
                    line: line.clone(),
                }),
                Ok(_) => {}
                Err(err) => failures.push(filter_error_status(tab.name(), &err)),
            }
        }

        for event in events {
            self.emit(event);
        }
        for message in failures {
            self.set_status(message);
        }
    }

    fn rebuild_at(&mut self, index: usize) -> RebuildReport {
        let tab = &mut self.tabs[index];
        let report = tab.rebuild(self.history.iter(), &self.options.timestamp_format);
        let id = tab.id();
        let failure = report
            .error
            .as_ref()
            .map(|err| filter_error_status(tab.name(), err));

        if let Some(message) = failure {
            self.set_status(message);
        }
        self.emit(SessionEvent::TabRebuilt { tab: id });
        self.refresh_stats();
        report
    }

    fn set_status(&mut self, message: String) {
        if self.status == message {
            return;
        }
        self.status = message;
        if !self.bulk_loading {
            let event = SessionEvent::Status(self.status.clone());
            self.emit(event);
        }
    }

    fn refresh_stats(&mut self) {
        let stats = StatsAggregator::compute(
            self.total_ingested,
            self.raw.len(),
            &self.tabs,
            self.selected,
        );
        if stats != self.stats {
            self.stats = stats;
            self.emit(SessionEvent::StatsChanged(stats));
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        if self.subscribers.is_empty() || (self.bulk_loading && event.is_per_line()) {
            return;
        }
        let mut dropped = 0usize;
        self.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            // Receiver gone: unsubscribe
            Err(TrySendError::Disconnected(_)) => false,
        });
        if dropped > 0 {
            tracing::trace!(subscribers = dropped, "subscriber queue full, event dropped");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

fn filter_error_status(tab_name: &str, err: &InvalidPattern) -> String {
    format!("{}: Filter error: {}", tab_name, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterMode;
    use crate::renderer::Color;
    use crate::test_utils::ts;

    fn session(capacity: usize) -> Session {
        Session::new(SessionOptions {
            capacity,
            ..SessionOptions::default()
        })
    }

    fn plain(expression: &str) -> RuleSettings {
        RuleSettings::new(expression, FilterMode::default())
    }

    fn regex(expression: &str) -> RuleSettings {
        RuleSettings::new(expression, FilterMode::from_flags(true, false))
    }

    fn ingest_all(session: &mut Session, lines: &[&str]) {
        for (i, line) in lines.iter().enumerate() {
            session.ingest(*line, ts(i as i64));
        }
    }

    fn tab_texts(session: &Session, id: TabId) -> Vec<String> {
        session
            .tab_lines(id)
            .unwrap()
            .iter()
            .map(|l| l.text.clone())
            .collect()
    }

    fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_ingest_fans_out_to_every_tab() {
        let mut session = session(100);
        let all = session.add_tab();
        let errors = session.add_tab();
        session.configure_tab(errors, plain("err")).unwrap();

        ingest_all(&mut session, &["boot", "ERR disk", "ok"]);

        assert_eq!(tab_texts(&session, all).len(), 3);
        assert_eq!(tab_texts(&session, errors), vec!["00:00:00.001 | ERR disk"]);
        assert_eq!(session.total_ingested(), 3);
        assert_eq!(
            session.raw_text(),
            "00:00:00.000 | boot\n00:00:00.001 | ERR disk\n00:00:00.002 | ok"
        );
    }

    #[test]
    fn test_history_and_views_are_bounded() {
        let mut session = session(3);
        let tab = session.add_tab();
        ingest_all(&mut session, &["a", "b", "c", "d"]);

        let history: Vec<&str> = session.history().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(history, vec!["b", "c", "d"]);
        assert_eq!(session.raw_line_count(), 3);
        assert_eq!(session.tab_lines(tab).unwrap().len(), 3);
        assert_eq!(session.total_ingested(), 4);
        assert_eq!(session.history().evicted(), 1);
    }

    #[test]
    fn test_pause_drops_lines() {
        let mut session = session(10);
        session.add_tab();
        session.ingest("before", ts(0));

        session.pause();
        assert!(!session.ingest("x", ts(1)));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.total_ingested(), 1);

        session.resume();
        assert!(session.ingest("after", ts(2)));
        let history: Vec<&str> = session.history().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(history, vec!["before", "after"]);
    }

    #[test]
    fn test_clear_resets_everything_but_tabs() {
        let mut session = session(10);
        let tab = session.add_tab();
        ingest_all(&mut session, &["a", "b"]);

        session.clear();

        assert!(session.history().is_empty());
        assert_eq!(session.raw_text(), "");
        assert_eq!(session.tab_lines(tab).unwrap().len(), 0);
        assert_eq!(session.total_ingested(), 0);
        assert_eq!(session.tabs().len(), 1);
        assert_eq!(session.stats().total_ingested, 0);
    }

    #[test]
    fn test_reconfigure_rebuilds_over_current_history() {
        let mut session = session(10);
        let tab = session.add_tab();
        ingest_all(&mut session, &["temp=40", "fan on", "temp=41"]);
        assert_eq!(tab_texts(&session, tab).len(), 3);

        let report = session.configure_tab(tab, regex(r"temp=\d+")).unwrap();

        assert_eq!(report.appended, 2);
        assert_eq!(
            tab_texts(&session, tab),
            vec!["00:00:00.000 | temp=40", "00:00:00.002 | temp=41"]
        );

        // Same settings, same history: identical output
        let before: Vec<RenderedLine> = session.tab_lines(tab).unwrap().iter().cloned().collect();
        session.rebuild_tab(tab).unwrap();
        let after: Vec<RenderedLine> = session.tab_lines(tab).unwrap().iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_invalid_regex_reports_status_and_keeps_other_tabs() {
        let mut session = session(10);
        let good = session.add_tab();
        let bad = session.add_tab();
        ingest_all(&mut session, &["a", "b"]);

        let report = session.configure_tab(bad, regex("(oops")).unwrap();
        assert!(report.error.is_some());
        assert!(
            session.status().starts_with("Filter 2: Filter error: "),
            "status: {}",
            session.status()
        );
        assert_eq!(session.tab_lines(bad).unwrap().len(), 0);

        // Live lines keep flowing to the healthy tab
        session.ingest("c", ts(5));
        assert_eq!(session.tab_lines(good).unwrap().len(), 3);
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.tab_lines(bad).unwrap().len(), 0);
    }

    #[test]
    fn test_tab_numbering_and_default_colors() {
        let mut session = session(10);
        let first = session.add_tab();
        let second = session.add_tab();
        session.remove_tab(second).unwrap();
        let third = session.add_tab();

        assert_eq!(first, TabId(1));
        assert_eq!(third, TabId(3));
        let tab = session.tab(third).unwrap();
        assert_eq!(tab.name(), "Filter 3");
        assert_eq!(tab.rule().settings.foreground, Color::default_foreground(3));
        assert_eq!(tab.rule().settings.background, Color::Transparent);
    }

    #[test]
    fn test_new_tab_is_selected_and_built_from_history() {
        let mut session = session(10);
        ingest_all(&mut session, &["a", "b"]);

        let tab = session.add_tab();

        assert_eq!(session.selected(), Some(tab));
        assert_eq!(session.tab_lines(tab).unwrap().len(), 2);
        assert_eq!(session.stats().selected_tab_lines, 2);
    }

    #[test]
    fn test_remove_selects_last_remaining() {
        let mut session = session(10);
        let a = session.add_tab();
        let b = session.add_tab();
        let c = session.add_tab();
        session.select_tab(a).unwrap();

        session.remove_tab(a).unwrap();
        assert_eq!(session.selected(), Some(c));

        session.remove_tab(c).unwrap();
        assert_eq!(session.selected(), Some(b));

        session.remove_tab(b).unwrap();
        assert_eq!(session.selected(), None);
        assert_eq!(session.stats().tab_count, 0);
    }

    #[test]
    fn test_unknown_tab_is_an_error() {
        let mut session = session(10);
        assert_eq!(
            session.select_tab(TabId(42)),
            Err(SessionError::UnknownTab(TabId(42)))
        );
        assert!(session.configure_tab(TabId(42), plain("x")).is_err());
        assert!(session.remove_tab(TabId(42)).is_err());
        assert!(session.tab_lines(TabId(42)).is_err());
    }

    #[test]
    fn test_rename_triggers_rebuild() {
        let mut session = session(10);
        let tab = session.add_tab();
        session.configure_tab(tab, regex("[")).unwrap();
        ingest_all(&mut session, &["a"]);

        let rx = session.subscribe();
        session.rename_tab(tab, "uart").unwrap();

        assert_eq!(session.tab(tab).unwrap().name(), "uart");
        assert!(session.status().starts_with("uart: Filter error: "));
        let events = drain(&rx);
        assert!(events.contains(&SessionEvent::TabRebuilt { tab }));
    }

    #[test]
    fn test_bulk_load_replaces_state_and_defers_events() {
        let mut session = session(10);
        let tab = session.add_tab();
        session.ingest("old", ts(0));
        session.pause();
        let rx = session.subscribe();

        let loaded = session.bulk_load(vec!["x", "y", "z"], "boot.log");

        assert_eq!(loaded, 3);
        assert_eq!(session.total_ingested(), 3);
        assert_eq!(session.tab_lines(tab).unwrap().len(), 3);
        assert_eq!(session.source_label(), "boot.log");
        assert_eq!(session.status(), "Loaded 3 lines from boot.log");

        let events = drain(&rx);
        assert!(!events.iter().any(SessionEvent::is_per_line));
        let stats_updates = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::StatsChanged(_)))
            .count();
        assert_eq!(stats_updates, 1);
        assert!(events.contains(&SessionEvent::BulkLoaded { lines: 3 }));
        assert!(events.contains(&SessionEvent::TabRebuilt { tab }));
    }

    #[test]
    fn test_invalid_timestamp_format_uses_default() {
        let mut session = Session::new(SessionOptions {
            capacity: 10,
            timestamp_format: "%Q".to_string(),
        });
        let tab = session.add_tab();

        assert_eq!(session.options().timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert!(session.ingest("hello", ts(0)));
        assert_eq!(tab_texts(&session, tab), vec!["00:00:00.000 | hello"]);
    }

    #[test]
    fn test_slow_subscriber_does_not_grow_without_bound() {
        let mut session = session(10);
        let rx = session.subscribe();

        // Each ingest emits a raw line and a stats update
        for i in 0..SUBSCRIBER_QUEUE_LEN {
            session.ingest(format!("line {}", i), ts(i as i64));
        }

        assert_eq!(drain(&rx).len(), SUBSCRIBER_QUEUE_LEN);
        assert_eq!(session.subscribers.len(), 1);

        // Once drained, the subscriber receives events again
        session.ingest("after", ts(0));
        let events = drain(&rx);
        assert_eq!(
            events[0],
            SessionEvent::RawLineAppended {
                line: "00:00:00.000 | after".to_string()
            }
        );
    }

    #[test]
    fn test_live_line_after_bulk_load_switches_label() {
        let mut session = session(10);
        session.bulk_load(["a"], "");
        assert_eq!(session.source_label(), "Loaded File");

        session.ingest("b", ts(1));
        assert_eq!(session.source_label(), LIVE_SOURCE_LABEL);
    }

    #[test]
    fn test_live_events_in_order() {
        let mut session = session(10);
        let tab = session.add_tab();
        let rx = session.subscribe();

        session.ingest("hello", ts(0));

        let events = drain(&rx);
        assert_eq!(
            events[0],
            SessionEvent::RawLineAppended {
                line: "00:00:00.000 | hello".to_string()
            }
        );
        match &events[1] {
            SessionEvent::LineAppended { tab: id, line } => {
                assert_eq!(*id, tab);
                assert_eq!(line.text, "00:00:00.000 | hello");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[2], SessionEvent::StatsChanged(_)));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut session = session(10);
        let rx = session.subscribe();
        drop(rx);
        let live = session.subscribe();

        session.add_tab();
        session.ingest("x", ts(0));

        assert_eq!(session.subscribers.len(), 1);
        assert!(!drain(&live).is_empty());
    }

    #[test]
    fn test_transport_error_sets_status_only() {
        let mut session = session(10);
        session.add_tab();
        session.ingest("a", ts(0));

        session.report_transport_error("framing error on COM3");

        assert_eq!(session.status(), "framing error on COM3");
        assert!(session.ingest("b", ts(1)));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_rebuild_all_reports_every_tab() {
        let mut session = session(10);
        let a = session.add_tab();
        let b = session.add_tab();
        session.configure_tab(b, plain("x")).unwrap();
        ingest_all(&mut session, &["x1", "y2"]);

        let reports = session.rebuild_all();
        let ids: Vec<TabId> = reports.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(reports[0].1.appended, 2);
        assert_eq!(reports[1].1.appended, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = session(10);
        let tab = session.add_tab();
        session.configure_tab(tab, plain("b")).unwrap();
        ingest_all(&mut session, &["abc"]);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.tabs.len(), 1);
        assert_eq!(snapshot.tabs[0].lines[0].highlight_count(), 1);
        assert_eq!(snapshot.selected, Some(tab));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["tabs"][0]["rule"]["name"], "Filter 1");
        assert_eq!(json["tabs"][0]["rule"]["expression"], "b");
        assert_eq!(json["stats"]["total_ingested"], 1);
    }

    #[test]
    fn test_stats_track_selection() {
        let mut session = session(10);
        let all = session.add_tab();
        let only_b = session.add_tab();
        session.configure_tab(only_b, plain("b")).unwrap();
        ingest_all(&mut session, &["a", "b", "c"]);

        assert_eq!(session.stats().selected_tab_lines, 1);
        session.select_tab(all).unwrap();
        assert_eq!(
            session.stats().to_string(),
            "Received: 3 | Visible raw: 3 | Selected filter lines: 3 | Filters: 2"
        );
    }
}
