use crate::error::{ChanopsError, Result};
use crate::io;
use chrono::{Duration, NaiveDateTime};
use std::path::{Path, PathBuf};

pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Gate between commit attempts, persisted across runs as one
/// seconds-resolution local timestamp in a small file.
///
/// The stamp is overwritten as soon as a commit is allowed to proceed,
/// before anything is written to the cluster. A failed downstream
/// update does not restore it: the window is consumed either way.
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    path: PathBuf,
    cooldown: Duration,
}

impl UpdateThrottle {
    pub fn new(path: impl Into<PathBuf>, cooldown: Duration) -> Self {
        Self {
            path: path.into(),
            cooldown,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Allow a commit iff no stamp exists or the last one is older than
    /// the cooldown, then record `now`. An unreadable stamp aborts the
    /// run rather than being silently ignored.
    pub fn check_and_record(&self, now: NaiveDateTime) -> Result<()> {
        if let Some(raw) = self.read_stamp()? {
            let last = NaiveDateTime::parse_from_str(raw.trim_end(), STAMP_FORMAT).map_err(
                |_| ChanopsError::BadStamp {
                    path: self.path.display().to_string(),
                    value: raw.clone(),
                },
            )?;
            let age = now - last;
            if age < self.cooldown {
                return Err(ChanopsError::RateLimited {
                    cooldown_minutes: self.cooldown.num_minutes(),
                    retry_secs: (self.cooldown - age).num_seconds(),
                });
            }
        }
        io::atomic_write(&self.path, now.format(STAMP_FORMAT).to_string().as_bytes())
    }

    fn read_stamp(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(None),
            Ok(s) => Ok(Some(s.lines().next().unwrap_or_default().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
