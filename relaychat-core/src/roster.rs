// relaychat-core/src/roster.rs
//! Participant identities and the live roster of connected participants.
//!
//! An [`Identity`] compares and hashes by its underlying handle only, never by
//! its display name, so two lookups that return differently-cased names for
//! the same participant still deduplicate.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// An opaque handle for one participant, with its canonical display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    id: Uuid,
    name: String,
}

impl Identity {
    /// Creates an identity with a fresh random handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The canonical display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_matches(&self, candidate: &str) -> bool {
        names_equal(&self.name, candidate)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Case-insensitive name comparison used for every roster lookup.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// A live view of the connected participants.
///
/// Implementations are queried at each point of need; two queries in the same
/// pipeline run may see different membership.
pub trait Roster: Send + Sync {
    fn list_online(&self) -> Vec<Identity>;

    /// Case-insensitive exact-name lookup.
    fn find_by_name(&self, name: &str) -> Option<Identity> {
        self.list_online().into_iter().find(|p| p.name_matches(name))
    }
}

impl<R: Roster + ?Sized> Roster for Arc<R> {
    fn list_online(&self) -> Vec<Identity> {
        (**self).list_online()
    }

    fn find_by_name(&self, name: &str) -> Option<Identity> {
        (**self).find_by_name(name)
    }
}

/// An in-memory roster that hosts update as participants connect and leave.
#[derive(Debug, Default)]
pub struct SharedRoster {
    players: RwLock<Vec<Identity>>,
}

impl SharedRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_identities(players: impl IntoIterator<Item = Identity>) -> Self {
        let roster = Self::new();
        for p in players {
            roster.connect(p);
        }
        roster
    }

    /// Adds a participant. Reconnecting an identity replaces its display name.
    pub fn connect(&self, identity: Identity) {
        let mut players = self.players.write();
        players.retain(|p| p != &identity);
        players.push(identity);
    }

    /// Removes a participant. Returns false if it was not online.
    pub fn disconnect(&self, identity: &Identity) -> bool {
        let mut players = self.players.write();
        let before = players.len();
        players.retain(|p| p != identity);
        players.len() != before
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty()
    }
}

impl Roster for SharedRoster {
    fn list_online(&self) -> Vec<Identity> {
        self.players.read().clone()
    }

    fn find_by_name(&self, name: &str) -> Option<Identity> {
        self.players.read().iter().find(|p| p.name_matches(name)).cloned()
    }
}
