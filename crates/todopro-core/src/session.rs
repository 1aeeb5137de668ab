//! Focus session records and the store that keeps them.
//!
//! The whole collection lives in memory and is written back in full to a
//! single [`SessionSlot`] after every mutation. Slot writes are best effort:
//! the in-memory collection is always updated first, and a failed write is
//! only reported to the caller.

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The durable record of one focus interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    /// Focused seconds actually accrued, written on completion or skip.
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub completed: bool,
}

impl FocusSession {
    /// A freshly opened, not yet completed session.
    pub fn open(id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            started_at,
            elapsed_seconds: 0,
            completed: false,
        }
    }
}

/// Partial update applied by [`SessionStore::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    pub completed: Option<bool>,
    pub elapsed_seconds: Option<u64>,
}

impl SessionPatch {
    pub fn complete(elapsed_seconds: u64) -> Self {
        Self {
            completed: Some(true),
            elapsed_seconds: Some(elapsed_seconds),
        }
    }

    fn apply(&self, session: &mut FocusSession) {
        if let Some(completed) = self.completed {
            session.completed = completed;
        }
        if let Some(elapsed) = self.elapsed_seconds {
            session.elapsed_seconds = elapsed;
        }
    }
}

/// One named slot holding the serialized session list.
pub trait SessionSlot {
    /// Raw slot contents, `None` if nothing was ever saved.
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, contents: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Slot kept in process memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded slot, as if a previous process had saved `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl SessionSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.contents.borrow_mut() = None;
        Ok(())
    }
}

impl<S: SessionSlot + ?Sized> SessionSlot for Box<S> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Ordered collection of focus sessions mirrored into a [`SessionSlot`].
#[derive(Debug)]
pub struct SessionStore<S> {
    slot: S,
    sessions: Vec<FocusSession>,
}

impl<S: SessionSlot> SessionStore<S> {
    /// Load the collection from `slot`.
    ///
    /// Unreadable or corrupt contents reset the store to empty and clear the
    /// slot; the loss is logged, never returned.
    pub fn open(slot: S) -> Self {
        let sessions = match slot.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FocusSession>>(&raw) {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::warn!(error = %e, "stored focus sessions are corrupt, starting empty");
                    if let Err(e) = slot.clear() {
                        tracing::warn!(error = %e, "failed to clear corrupt session slot");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read focus sessions, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = sessions.len(), "loaded focus sessions");
        Self { slot, sessions }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    pub fn list_all(&self) -> &[FocusSession] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&FocusSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Append a session and persist.
    pub fn create(&mut self, session: FocusSession) -> Result<()> {
        tracing::debug!(id = %session.id, "creating focus session");
        self.sessions.push(session);
        self.persist()
    }

    /// Patch the session with `id`. Returns `Ok(false)` if there is none.
    pub fn update(&mut self, id: &str, patch: SessionPatch) -> Result<bool> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        patch.apply(session);
        tracing::debug!(id, ?patch, "updated focus session");
        self.persist()?;
        Ok(true)
    }

    /// Remove the session with `id`. Returns `Ok(false)` if there is none.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Ok(false);
        }
        tracing::debug!(id, "deleted focus session");
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.sessions)?;
        self.slot.write(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, DatabaseError};

    struct FailingSlot;

    impl SessionSlot for FailingSlot {
        fn read(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, _contents: &str) -> Result<()> {
            Err(CoreError::Database(DatabaseError::Locked))
        }

        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    fn session(id: &str) -> FocusSession {
        FocusSession::open(id, Utc::now())
    }

    #[test]
    fn create_update_delete() {
        let mut store = SessionStore::open(MemorySlot::new());
        store.create(session("a")).unwrap();
        store.create(session("b")).unwrap();
        assert_eq!(store.list_all().len(), 2);

        assert!(store.update("a", SessionPatch::complete(60)).unwrap());
        let a = store.get("a").unwrap();
        assert!(a.completed);
        assert_eq!(a.elapsed_seconds, 60);

        assert!(store.delete("b").unwrap());
        assert_eq!(store.list_all().len(), 1);
        assert!(!store.delete("b").unwrap());
        assert!(!store.update("missing", SessionPatch::complete(1)).unwrap());
    }

    #[test]
    fn mutations_rewrite_the_slot_in_order() {
        let mut store = SessionStore::open(MemorySlot::new());
        store.create(session("first")).unwrap();
        store.create(session("second")).unwrap();

        let raw = store.slot().contents().unwrap();
        let saved: Vec<FocusSession> = serde_json::from_str(&raw).unwrap();
        let ids: Vec<_> = saved.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
    }

    #[test]
    fn reopening_reads_saved_sessions() {
        let mut store = SessionStore::open(MemorySlot::new());
        store.create(session("kept")).unwrap();
        let raw = store.slot().contents().unwrap();

        let reopened = SessionStore::open(MemorySlot::with_contents(raw));
        assert_eq!(reopened.list_all().len(), 1);
        assert_eq!(reopened.list_all()[0].id, "kept");
    }

    #[test]
    fn corrupt_slot_resets_to_empty_and_clears() {
        let store = SessionStore::open(MemorySlot::with_contents("{not json"));
        assert!(store.list_all().is_empty());
        assert!(store.slot().contents().is_none());
    }

    #[test]
    fn write_failure_still_updates_memory() {
        let mut store = SessionStore::open(FailingSlot);
        assert!(store.create(session("x")).is_err());
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn session_json_uses_camel_case() {
        let json = serde_json::to_value(session("id-1")).unwrap();
        assert!(json.get("startedAt").is_some());
        assert_eq!(json["elapsedSeconds"], 0);
        assert_eq!(json["completed"], false);
    }
}
