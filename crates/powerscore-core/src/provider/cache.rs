// ── Session cache ──
//
// Remembers the last analyzed origin and its session id so a repeated
// analysis of the same site can skip the setup action.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{SessionId, SetupInfo};

/// The last setup result worth reusing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSession {
    pub origin: String,
    pub id: SessionId,
    pub saved_at: DateTime<Utc>,
}

impl CachedSession {
    pub fn from_setup(setup: &SetupInfo) -> Self {
        Self {
            origin: setup.origin.clone(),
            id: setup.id.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn to_setup(&self) -> SetupInfo {
        SetupInfo {
            origin: self.origin.clone(),
            id: self.id.clone(),
        }
    }
}

/// Storage for the last analysis session.
pub trait SessionCache: Send + Sync {
    fn load(&self) -> Result<Option<CachedSession>, CoreError>;
    fn store(&self, session: &CachedSession) -> Result<(), CoreError>;
}

/// Process-local cache; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    session: Mutex<Option<CachedSession>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemorySessionCache {
    fn load(&self) -> Result<Option<CachedSession>, CoreError> {
        Ok(self.session.lock().clone())
    }

    fn store(&self, session: &CachedSession) -> Result<(), CoreError> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }
}
