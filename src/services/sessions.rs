// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side session storage.
//!
//! A session maps an opaque per-client token to at most one username.
//! Logging in binds a username to a token that holds none; logging out
//! removes the binding.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Why a login or logout was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0} is already logged in")]
    AlreadyLoggedIn(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No user is logged in")]
    NotLoggedIn,
}

/// Storage for session bindings.
///
/// Implementations must make `bind` atomic per session token: two
/// concurrent binds on the same token cannot both succeed.
pub trait SessionStore: Send + Sync {
    /// Username bound to `session_id`, if any.
    fn get(&self, session_id: &str) -> Option<String>;

    /// Bind `username` to `session_id` unless it already holds a username.
    ///
    /// On conflict, returns the username that is already bound.
    fn bind(&self, session_id: &str, username: &str) -> Result<(), String>;

    /// Remove the binding, returning the username that was bound.
    fn unbind(&self, session_id: &str) -> Option<String>;
}

struct SessionEntry {
    username: String,
    last_seen: Instant,
}

/// In-memory session store with idle expiry.
///
/// Expired entries behave as absent and are dropped lazily on access or in
/// bulk by [`MemorySessionStore::purge_expired`].
pub struct MemorySessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        entry.last_seen.elapsed() > self.ttl
    }

    /// Drop all expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.last_seen.elapsed() <= self.ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Number of live (unexpired) sessions.
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !self.is_expired(entry.value()))
            .count()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> Option<String> {
        let mut entry = self.entries.get_mut(session_id)?;
        if self.is_expired(&entry) {
            // Release the shard lock before removing.
            drop(entry);
            self.entries
                .remove_if(session_id, |_, entry| self.is_expired(entry));
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.username.clone())
    }

    fn bind(&self, session_id: &str, username: &str) -> Result<(), String> {
        let fresh = SessionEntry {
            username: username.to_string(),
            last_seen: Instant::now(),
        };

        match self.entries.entry(session_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if self.is_expired(occupied.get()) {
                    occupied.insert(fresh);
                    Ok(())
                } else {
                    Err(occupied.get().username.clone())
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(())
            }
        }
    }

    fn unbind(&self, session_id: &str) -> Option<String> {
        let (_, entry) = self.entries.remove(session_id)?;
        if self.is_expired(&entry) {
            None
        } else {
            Some(entry.username)
        }
    }
}
