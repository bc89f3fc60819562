//! Host Identity Data
//!
//! Plain identity types for host objects. No behavior beyond formatting and
//! id allocation lives here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique id of one host instance
///
/// A replaced host gets a fresh id even though it represents the same
/// logical object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostId(pub u64);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of host an extension provider can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostCategory {
    Player,
    World,
    Team,
    Entity,
    Custom(String),
}

impl HostCategory {
    pub fn as_str(&self) -> &str {
        match self {
            HostCategory::Player => "player",
            HostCategory::World => "world",
            HostCategory::Team => "team",
            HostCategory::Entity => "entity",
            HostCategory::Custom(name) => name,
        }
    }
}

impl fmt::Display for HostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight handle identifying a host instance
///
/// Extensions that need to know their owner keep one of these instead of a
/// reference to the host itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRef {
    pub id: HostId,
    pub category: HostCategory,
}

impl HostRef {
    pub fn new(id: HostId, category: HostCategory) -> Self {
        Self { id, category }
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.category, self.id)
    }
}

/// Thread-safe allocator for host ids
#[derive(Debug)]
pub struct HostIdGenerator {
    next: AtomicU64,
}

impl HostIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Start allocating from `first`, e.g. after restoring a saved world
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> HostId {
        HostId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for HostIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
