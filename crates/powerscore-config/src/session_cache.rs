// ── File-backed session cache ──
//
// One JSON document holding the last analyzed origin and its session id.
// Stale or unreadable entries behave like an empty cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{TimeDelta, Utc};
use tracing::{debug, warn};

use powerscore_core::{CachedSession, CoreError, SessionCache};

/// How long a backend session stays worth reusing.
const DEFAULT_MAX_AGE_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct FileSessionCache {
    path: PathBuf,
    max_age: TimeDelta,
}

impl FileSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: TimeDelta::hours(DEFAULT_MAX_AGE_HOURS),
        }
    }

    /// Cache at the platform cache directory.
    pub fn at_default_path() -> Self {
        Self::new(crate::session_cache_path())
    }

    pub fn with_max_age(mut self, max_age: TimeDelta) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the stored session.
    pub fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Config {
        message: format!("session cache {}: {err}", path.display()),
    }
}

impl SessionCache for FileSessionCache {
    fn load(&self) -> Result<Option<CachedSession>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, &e)),
        };

        let session: CachedSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupt session cache");
                return Ok(None);
            }
        };

        if Utc::now() - session.saved_at > self.max_age {
            debug!(origin = %session.origin, "cached session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn store(&self, session: &CachedSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(&self.path, &e))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| CoreError::Internal(format!("session cache encoding: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| io_error(&self.path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerscore_core::model::SessionId;

    fn session(age: TimeDelta) -> CachedSession {
        CachedSession {
            origin: "https://www.example.com".into(),
            id: SessionId::new("abc"),
            saved_at: Utc::now() - age,
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSessionCache::new(dir.path().join("nested/session.json"));
        assert!(cache.load().unwrap().is_none());
        cache.clear().unwrap();
    }

    #[test]
    fn stores_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSessionCache::new(dir.path().join("nested/session.json"));
        let stored = session(TimeDelta::zero());
        cache.store(&stored).unwrap();

        assert_eq!(cache.load().unwrap(), Some(stored));
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn expired_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache =
            FileSessionCache::new(dir.path().join("session.json")).with_max_age(TimeDelta::hours(1));
        cache.store(&session(TimeDelta::hours(2))).unwrap();
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(FileSessionCache::new(path).load().unwrap().is_none());
    }
}
