use std::cell::Cell;

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::page::Console;

pub const OPENED_LINE: &str = "websocket opened";
pub const CLOSED_LINE: &str = "websocket closed";
pub const ERROR_LINE: &str = "websocket error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent<E> {
    Message(String),
    Opened,
    Closed,
    Error(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketState {
    #[default]
    Closed,
    Connecting,
    Open,
    Errored,
}

impl SocketState {
    /// State after `event`, or `None` if the event is unexpected in `self`.
    /// The browser drives the socket, so callers still follow unexpected events.
    pub fn next<E>(self, event: &SocketEvent<E>) -> Option<SocketState> {
        use SocketState::*;
        match (self, event) {
            (Connecting, SocketEvent::Opened) => Some(Open),
            (Open, SocketEvent::Message(_)) => Some(Open),
            (Connecting | Open | Errored, SocketEvent::Closed) => Some(Closed),
            (Connecting | Open, SocketEvent::Error(_)) => Some(Errored),
            _ => None,
        }
    }

    fn after<E>(event: &SocketEvent<E>) -> SocketState {
        match event {
            SocketEvent::Message(_) | SocketEvent::Opened => SocketState::Open,
            SocketEvent::Closed => SocketState::Closed,
            SocketEvent::Error(_) => SocketState::Errored,
        }
    }
}

/// Opens the live-log connection. The listener sees every lifecycle event.
pub trait LogSocket {
    type Error;
    type Connection;

    fn open(
        &self,
        url: &str,
        listener: Box<dyn FnMut(SocketEvent<Self::Error>)>,
    ) -> Result<Self::Connection, ClientError>;
}

/// Passive listener that mirrors socket events onto the console.
pub struct LiveLog<C> {
    console: C,
    state: Cell<SocketState>,
}

impl<C: Console> LiveLog<C> {
    pub fn new(console: C) -> Self {
        Self {
            console,
            state: Cell::new(SocketState::Closed),
        }
    }

    pub fn state(&self) -> SocketState {
        self.state.get()
    }

    pub(crate) fn connecting(&self) {
        self.transition(SocketState::Connecting);
    }

    pub fn handle(&self, event: SocketEvent<C::Object>) {
        let next = match self.state.get().next(&event) {
            Some(s) => s,
            None => {
                warn!(state = ?self.state.get(), "unexpected live-log socket event");
                SocketState::after(&event)
            }
        };
        self.transition(next);

        match event {
            SocketEvent::Message(payload) => self.console.log(&payload),
            SocketEvent::Opened => self.console.log(OPENED_LINE),
            SocketEvent::Closed => self.console.log(CLOSED_LINE),
            SocketEvent::Error(e) => {
                self.console.log(ERROR_LINE);
                self.console.log_obj(&e);
            }
        }
    }

    fn transition(&self, next: SocketState) {
        let prev = self.state.replace(next);
        if prev != next {
            debug!(from = ?prev, to = ?next, "live-log socket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConsole, LogLine};

    #[test]
    fn lifecycle_transitions() {
        use SocketState::*;
        let ev = |e: SocketEvent<()>| e;
        assert_eq!(Connecting.next(&ev(SocketEvent::Opened)), Some(Open));
        assert_eq!(Open.next(&ev(SocketEvent::Message("m".into()))), Some(Open));
        assert_eq!(Open.next(&ev(SocketEvent::Closed)), Some(Closed));
        assert_eq!(Open.next(&ev(SocketEvent::Error(()))), Some(Errored));
        assert_eq!(Errored.next(&ev(SocketEvent::Closed)), Some(Closed));
        assert_eq!(Connecting.next(&ev(SocketEvent::Error(()))), Some(Errored));
        assert_eq!(Closed.next(&ev(SocketEvent::Opened)), None);
        assert_eq!(Closed.next(&ev(SocketEvent::Message("late".into()))), None);
    }

    #[test]
    fn message_is_logged_verbatim_once() {
        let console = FakeConsole::default();
        let live = LiveLog::new(console.clone());
        live.connecting();
        live.handle(SocketEvent::Opened);
        live.handle(SocketEvent::Message("hello".into()));

        assert_eq!(
            console.lines(),
            vec![LogLine::Text(OPENED_LINE.into()), LogLine::Text("hello".into())]
        );
        assert_eq!(live.state(), SocketState::Open);
    }

    #[test]
    fn error_logs_line_then_object() {
        let console = FakeConsole::default();
        let live = LiveLog::new(console.clone());
        live.connecting();
        live.handle(SocketEvent::Opened);
        live.handle(SocketEvent::Error("ECONNRESET".to_string()));
        live.handle(SocketEvent::Closed);

        assert_eq!(
            console.lines(),
            vec![
                LogLine::Text(OPENED_LINE.into()),
                LogLine::Text(ERROR_LINE.into()),
                LogLine::Object("ECONNRESET".into()),
                LogLine::Text(CLOSED_LINE.into()),
            ]
        );
        assert_eq!(live.state(), SocketState::Closed);
    }

    #[test]
    fn unexpected_events_are_still_logged() {
        let console = FakeConsole::default();
        let live = LiveLog::new(console.clone());
        live.handle(SocketEvent::Message("stray".into()));
        assert_eq!(console.lines(), vec![LogLine::Text("stray".into())]);
        assert_eq!(live.state(), SocketState::Open);
    }
}
