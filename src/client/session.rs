//! Session-scoped realtime transport handle.
//!
//! One `RealtimeSession` exists per authenticated session and is injected
//! into whichever views need live updates; its lifecycle is tied to
//! authentication state via explicit [`RealtimeSession::connect`] /
//! [`RealtimeSession::disconnect`] calls rather than living as a module-wide
//! singleton.
//!
//! The session is transport-agnostic. A transport pump (for example a
//! WebSocket task) drains outbound [`ClientMessage`]s from
//! [`RealtimeSession::take_outbound`] and feeds inbound [`BoardEvent`]s to
//! [`RealtimeSession::dispatch`]. Listener registration returns a
//! [`SubscriptionId`] that must be released with
//! [`RealtimeSession::release`]; registration and release always come in
//! pairs so view teardown cannot leak listeners.
//!
//! Outbound notifications are fire-and-forget: when the session is
//! disconnected they are dropped silently and the board degrades to "no live
//! updates" without blocking any CRUD action.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::event::{BoardEvent, ClientMessage, EventKind};

/// Handle for a registered listener. Release it when the view goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId {
    kind: EventKind,
    id: u64,
}

struct Listener {
    id: u64,
    tx: mpsc::UnboundedSender<BoardEvent>,
}

struct SessionInner {
    connected: bool,
    next_listener: u64,
    listeners: HashMap<EventKind, Vec<Listener>>,
    outbound_tx: Option<mpsc::UnboundedSender<ClientMessage>>,
    outbound_rx: Option<mpsc::UnboundedReceiver<ClientMessage>>,
}

/// Shared realtime connection object with explicit lifecycle.
pub struct RealtimeSession {
    inner: Mutex<SessionInner>,
}

impl RealtimeSession {
    /// Create a disconnected session.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                connected: false,
                next_listener: 0,
                listeners: HashMap::new(),
                outbound_tx: None,
                outbound_rx: None,
            }),
        }
    }

    /// Open the session. Called when authentication succeeds. Reconnecting
    /// replaces the outbound queue; room membership is not restored here,
    /// callers re-issue their joins explicitly.
    pub fn connect(&self) {
        let mut inner = self.inner.lock().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        inner.outbound_tx = Some(tx);
        inner.outbound_rx = Some(rx);
        inner.connected = true;
        tracing::debug!("realtime session connected");
    }

    /// Close the session and drop every registered listener. Called on
    /// logout or when the transport goes away for good.
    pub fn disconnect(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        inner.outbound_tx = None;
        inner.outbound_rx = None;
        inner.listeners.clear();
        tracing::debug!("realtime session disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().unwrap().connected
    }

    /// Take the outbound message stream. The transport pump owns it for the
    /// lifetime of the connection.
    pub fn take_outbound(&self) -> Option<mpsc::UnboundedReceiver<ClientMessage>> {
        self.inner.lock().unwrap().outbound_rx.take()
    }

    /// Queue a message for the server, fire-and-forget. Dropped silently
    /// when disconnected.
    pub fn emit(&self, message: ClientMessage) {
        let inner = self.inner.lock().unwrap();
        match (&inner.connected, &inner.outbound_tx) {
            (true, Some(tx)) => {
                if tx.send(message).is_err() {
                    tracing::debug!("realtime transport gone, dropping outbound message");
                }
            }
            _ => {
                tracing::debug!("realtime session offline, dropping outbound message");
            }
        }
    }

    pub fn join_project(&self, project_id: Uuid) {
        self.emit(ClientMessage::JoinProject { project_id });
    }

    pub fn leave_project(&self, project_id: Uuid) {
        self.emit(ClientMessage::LeaveProject { project_id });
    }

    /// Register a listener for one event kind. Returns the subscription
    /// handle and the receiving end the listener reads events from.
    pub fn on(&self, kind: EventKind) -> (SubscriptionId, mpsc::UnboundedReceiver<BoardEvent>) {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_listener;
        inner.next_listener += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        inner
            .listeners
            .entry(kind)
            .or_default()
            .push(Listener { id, tx });
        (SubscriptionId { kind, id }, rx)
    }

    /// Deregister a listener. Releasing twice is a no-op.
    pub fn release(&self, subscription: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(listeners) = inner.listeners.get_mut(&subscription.kind) {
            listeners.retain(|l| l.id != subscription.id);
        }
    }

    /// Deliver an inbound event to every live listener of its kind. Closed
    /// receivers are pruned. Returns the number of listeners reached.
    pub fn dispatch(&self, event: &BoardEvent) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let Some(listeners) = inner.listeners.get_mut(&event.kind()) else {
            return 0;
        };
        listeners.retain(|l| !l.tx.is_closed());
        let mut delivered = 0;
        for listener in listeners.iter() {
            if listener.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of registered listeners across all kinds.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .listeners
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl Default for RealtimeSession {
    fn default() -> Self {
        Self::new()
    }
}
