//! Per-session request accounting.

use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One user's interactive usage window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: String,

    /// Successful generations performed in this session. Never decreases.
    pub request_count: u32,

    /// Deadline of the active cooldown, if one is armed.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub blocked_until: Option<DateTime<Utc>>,

    /// When the session was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// When the session was last updated.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session with zeroed counters.
    pub fn new(session_id: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            request_count: 0,
            blocked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record one successful generation.
    pub fn record_generation(&mut self, now: DateTime<Utc>) {
        self.request_count += 1;
        self.updated_at = now;
    }

    /// Arm the cooldown until `deadline`.
    pub fn block_until(&mut self, deadline: DateTime<Utc>, now: DateTime<Utc>) {
        self.blocked_until = Some(deadline);
        self.updated_at = now;
    }

    /// Clear an expired cooldown.
    pub fn clear_block(&mut self, now: DateTime<Utc>) {
        self.blocked_until = None;
        self.updated_at = now;
    }
}

/// In-memory store of sessions keyed by session id.
///
/// Lifecycle is tied to the process; nothing is persisted. Each session's
/// state is only ever touched through the guard returned by [`get_or_init`],
/// which provides the read-modify-write atomicity a single interactive
/// session needs.
///
/// [`get_or_init`]: SessionStore::get_or_init
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `session_id`, creating a fresh one if absent.
    pub fn get_or_init(&self, session_id: &str) -> RefMut<'_, String, Session> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id.to_string()))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
