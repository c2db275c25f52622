//! Transport-agnostic room routing.
//!
//! A room is a named broadcast group; connections join and leave by name and
//! a broadcast walks the room's current membership once. Delivery is
//! at-most-once and best-effort: a send to a connection whose channel has
//! closed is dropped and the connection is pruned, never retried. The sender
//! of an event receives it back like everyone else if it is in the room.
//!
//! Room names follow the `project-{uuid}` / `user-{uuid}` convention; every
//! connection is placed in its personal user room at registration.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::event::BoardEvent;

/// Opaque handle for one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

struct Connection {
    user_id: Uuid,
    tx: mpsc::UnboundedSender<BoardEvent>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Shared room registry. Interior mutability behind a std `Mutex`; every
/// operation is a short critical section with no awaits inside.
#[derive(Default)]
pub struct RoomRouter {
    next_id: AtomicU64,
    registry: Mutex<Registry>,
}

/// Room name for a project board.
pub fn project_room(project_id: Uuid) -> String {
    format!("project-{project_id}")
}

/// Personal room every connection of a user sits in.
pub fn user_room(user_id: Uuid) -> String {
    format!("user-{user_id}")
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and auto-join its personal user room.
    pub fn register(
        &self,
        user_id: Uuid,
        tx: mpsc::UnboundedSender<BoardEvent>,
    ) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registry = self.registry.lock().expect("room registry poisoned");
        registry.connections.insert(id, Connection { user_id, tx });
        registry
            .rooms
            .entry(user_room(user_id))
            .or_default()
            .insert(id);
        id
    }

    /// Drop a connection from every room. Idempotent.
    pub fn unregister(&self, id: ConnectionId) {
        let mut registry = self.registry.lock().expect("room registry poisoned");
        registry.connections.remove(&id);
        registry.rooms.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
    }

    /// Join a room. Joining a room the connection is already in is a no-op.
    pub fn join(&self, id: ConnectionId, room: &str) {
        let mut registry = self.registry.lock().expect("room registry poisoned");
        if !registry.connections.contains_key(&id) {
            return;
        }
        registry.rooms.entry(room.to_string()).or_default().insert(id);
    }

    /// Leave a room. Leaving a room the connection is not in is a no-op.
    pub fn leave(&self, id: ConnectionId, room: &str) {
        let mut registry = self.registry.lock().expect("room registry poisoned");
        if let Some(members) = registry.rooms.get_mut(room) {
            members.remove(&id);
            if members.is_empty() {
                registry.rooms.remove(room);
            }
        }
    }

    pub fn is_in_room(&self, id: ConnectionId, room: &str) -> bool {
        let registry = self.registry.lock().expect("room registry poisoned");
        registry.rooms.get(room).is_some_and(|m| m.contains(&id))
    }

    /// User a connection authenticated as, if it is still registered.
    pub fn user_of(&self, id: ConnectionId) -> Option<Uuid> {
        let registry = self.registry.lock().expect("room registry poisoned");
        registry.connections.get(&id).map(|c| c.user_id)
    }

    /// Broadcast to every connection currently in the room, the sender
    /// included. Returns the number of connections the event was queued to.
    pub fn broadcast(&self, room: &str, event: &BoardEvent) -> usize {
        let mut registry = self.registry.lock().expect("room registry poisoned");
        let Some(members) = registry.rooms.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for &member in members {
            match registry.connections.get(&member) {
                Some(conn) if conn.tx.send(event.clone()).is_ok() => delivered += 1,
                _ => dead.push(member),
            }
        }

        for id in dead {
            registry.connections.remove(&id);
            registry.rooms.retain(|_, members| {
                members.remove(&id);
                !members.is_empty()
            });
        }
        delivered
    }

    /// Connection count in a room.
    pub fn room_size(&self, room: &str) -> usize {
        let registry = self.registry.lock().expect("room registry poisoned");
        registry.rooms.get(room).map_or(0, HashSet::len)
    }
}
