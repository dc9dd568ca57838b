//! The serialization boundary around a [`Session`].
//!
//! [`IngestDispatcher::spawn`] moves the session onto its own thread, which
//! executes commands one at a time in arrival order. Producers (line
//! sources) and presentation code talk to it through cloneable
//! [`DispatcherHandle`]s, so no caller ever touches session state directly.

use chrono::{DateTime, Local};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::{DispatchError, SessionError};
use crate::event::SessionEvent;
use crate::filter::RuleSettings;
use crate::renderer::RenderedLine;
use crate::session::{Session, SessionSnapshot};
use crate::source::LineSink;
use crate::stats::Stats;
use crate::tab::{RebuildReport, TabId};

type Reply<T> = Sender<T>;
type SessionCall = Box<dyn FnOnce(&mut Session) + Send>;

/// Work items executed on the dispatcher thread
enum Command {
    Ingest {
        text: String,
        timestamp: DateTime<Local>,
    },
    TransportError(String),
    Clear,
    Pause,
    Resume,
    BulkLoad {
        lines: Vec<String>,
        label: String,
        reply: Reply<usize>,
    },
    AddTab {
        reply: Reply<TabId>,
    },
    RemoveTab {
        id: TabId,
        reply: Reply<Result<(), SessionError>>,
    },
    ConfigureTab {
        id: TabId,
        settings: RuleSettings,
        reply: Reply<Result<RebuildReport, SessionError>>,
    },
    RenameTab {
        id: TabId,
        name: String,
        reply: Reply<Result<RebuildReport, SessionError>>,
    },
    SelectTab {
        id: TabId,
        reply: Reply<Result<(), SessionError>>,
    },
    RebuildAll {
        reply: Reply<Vec<(TabId, RebuildReport)>>,
    },
    Subscribe {
        reply: Reply<Receiver<SessionEvent>>,
    },
    /// Arbitrary closure run against the session, used for queries
    Call(SessionCall),
    Shutdown,
}

/// Owner of the dispatcher thread.
pub struct IngestDispatcher {
    handle: DispatcherHandle,
    thread: JoinHandle<Session>,
}

impl IngestDispatcher {
    /// Move `session` onto a new dispatcher thread.
    pub fn spawn(session: Session) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread = thread::spawn(move || run(session, rx));
        Self {
            handle: DispatcherHandle { tx },
            thread,
        }
    }

    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Stop the thread once every queued command has run, and hand the
    /// session back.
    pub fn shutdown(self) -> Result<Session, DispatchError> {
        // The thread may already be gone; join reports that below
        let _ = self.handle.send(Command::Shutdown);
        self.thread.join().map_err(|_| DispatchError::Disconnected)
    }
}

fn run(mut session: Session, rx: Receiver<Command>) -> Session {
    tracing::debug!("dispatcher started");
    while let Ok(command) = rx.recv() {
        match command {
            Command::Ingest { text, timestamp } => {
                session.ingest(text, timestamp);
            }
            Command::TransportError(message) => session.report_transport_error(message),
            Command::Clear => session.clear(),
            Command::Pause => session.pause(),
            Command::Resume => session.resume(),
            Command::BulkLoad {
                lines,
                label,
                reply,
            } => {
                let _ = reply.send(session.bulk_load(lines, &label));
            }
            Command::AddTab { reply } => {
                let _ = reply.send(session.add_tab());
            }
            Command::RemoveTab { id, reply } => {
                let _ = reply.send(session.remove_tab(id));
            }
            Command::ConfigureTab {
                id,
                settings,
                reply,
            } => {
                let _ = reply.send(session.configure_tab(id, settings));
            }
            Command::RenameTab { id, name, reply } => {
                let _ = reply.send(session.rename_tab(id, name));
            }
            Command::SelectTab { id, reply } => {
                let _ = reply.send(session.select_tab(id));
            }
            Command::RebuildAll { reply } => {
                let _ = reply.send(session.rebuild_all());
            }
            Command::Subscribe { reply } => {
                let _ = reply.send(session.subscribe());
            }
            Command::Call(call) => call(&mut session),
            Command::Shutdown => break,
        }
    }
    tracing::debug!("dispatcher stopped");
    session
}

/// Cloneable access to a running dispatcher.
///
/// Mutations without a result are queued and return immediately; everything
/// that produces a value waits for the dispatcher's reply. All calls fail
/// with [`DispatchError::Disconnected`] once the dispatcher has stopped.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: Sender<Command>,
}

impl DispatcherHandle {
    fn send(&self, command: Command) -> Result<(), DispatchError> {
        self.tx.send(command).map_err(|_| DispatchError::Disconnected)
    }

    fn request<R>(&self, make: impl FnOnce(Reply<R>) -> Command) -> Result<R, DispatchError> {
        let (reply, rx) = mpsc::channel();
        self.send(make(reply))?;
        rx.recv().map_err(|_| DispatchError::Disconnected)
    }

    pub fn ingest(
        &self,
        text: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Result<(), DispatchError> {
        self.send(Command::Ingest {
            text: text.into(),
            timestamp,
        })
    }

    pub fn report_transport_error(&self, message: impl Into<String>) -> Result<(), DispatchError> {
        self.send(Command::TransportError(message.into()))
    }

    pub fn clear(&self) -> Result<(), DispatchError> {
        self.send(Command::Clear)
    }

    pub fn pause(&self) -> Result<(), DispatchError> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), DispatchError> {
        self.send(Command::Resume)
    }

    /// Replace the session contents; runs as a single command, so no live
    /// line can interleave with it.
    pub fn bulk_load(&self, lines: Vec<String>, label: impl Into<String>) -> Result<usize, DispatchError> {
        let label = label.into();
        self.request(|reply| Command::BulkLoad {
            lines,
            label,
            reply,
        })
    }

    pub fn add_tab(&self) -> Result<TabId, DispatchError> {
        self.request(|reply| Command::AddTab { reply })
    }

    pub fn remove_tab(&self, id: TabId) -> Result<(), DispatchError> {
        self.request(|reply| Command::RemoveTab { id, reply })?
            .map_err(DispatchError::from)
    }

    pub fn configure_tab(&self, id: TabId, settings: RuleSettings) -> Result<RebuildReport, DispatchError> {
        self.request(|reply| Command::ConfigureTab {
            id,
            settings,
            reply,
        })?
        .map_err(DispatchError::from)
    }

    pub fn rename_tab(&self, id: TabId, name: impl Into<String>) -> Result<RebuildReport, DispatchError> {
        let name = name.into();
        self.request(|reply| Command::RenameTab { id, name, reply })?
            .map_err(DispatchError::from)
    }

    pub fn select_tab(&self, id: TabId) -> Result<(), DispatchError> {
        self.request(|reply| Command::SelectTab { id, reply })?
            .map_err(DispatchError::from)
    }

    pub fn rebuild_all(&self) -> Result<Vec<(TabId, RebuildReport)>, DispatchError> {
        self.request(|reply| Command::RebuildAll { reply })
    }

    pub fn subscribe(&self) -> Result<Receiver<SessionEvent>, DispatchError> {
        self.request(|reply| Command::Subscribe { reply })
    }

    /// Run `f` on the dispatcher thread and return its result.
    pub fn with_session<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Session) -> R + Send + 'static,
    {
        self.request(|reply| {
            Command::Call(Box::new(move |session: &mut Session| {
                let _ = reply.send(f(session));
            }))
        })
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, DispatchError> {
        self.with_session(|session| session.snapshot())
    }

    pub fn stats(&self) -> Result<Stats, DispatchError> {
        self.with_session(|session| session.stats())
    }

    pub fn status(&self) -> Result<String, DispatchError> {
        self.with_session(|session| session.status().to_string())
    }

    pub fn raw_text(&self) -> Result<String, DispatchError> {
        self.with_session(|session| session.raw_text())
    }

    pub fn tab_lines(&self, id: TabId) -> Result<Vec<RenderedLine>, DispatchError> {
        self.with_session(move |session| {
            session
                .tab_lines(id)
                .map(|lines| lines.iter().cloned().collect::<Vec<_>>())
        })?
        .map_err(DispatchError::from)
    }
}

/// Live sources post straight into the dispatcher, stamped on arrival.
impl LineSink for DispatcherHandle {
    fn on_line(&self, line: String) -> bool {
        self.ingest(line, Local::now()).is_ok()
    }

    fn on_error(&self, message: String) {
        let _ = self.report_transport_error(message);
    }

    fn on_closed(&self) {
        tracing::debug!("line source closed");
    }
}
