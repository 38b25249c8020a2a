//! Append-only activity log.
//!
//! Every observed channel event is recorded as one line of the form
//! `[HH:MM:SS] text`, flushed to disk before the call returns. The log is
//! the bot's product, distinct from `tracing` diagnostics.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

/// Shape of `time.asctime`-style stamps embedded in log record bodies.
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Current local time in asctime shape, e.g. `Mon Aug 24 14:03:07 2026`.
pub fn asctime_now() -> String {
    Local::now().format(ASCTIME_FORMAT).to_string()
}

/// Flush-per-write sink for channel activity.
///
/// The file handle is released when the log is dropped, on every exit path
/// of the owning session.
pub struct ActivityLog {
    file: File,
}

impl ActivityLog {
    /// Open the log file in append mode, creating it if missing.
    ///
    /// Failure here is fatal to the connection attempt: the session must
    /// not start its handshake without a working log sink.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self { file })
    }

    /// Append one timestamped line and flush it before returning.
    pub fn log(&mut self, text: &str) -> io::Result<()> {
        let stamp = Local::now().format("[%H:%M:%S]");
        self.file.write_all(format!("{} {}\n", stamp, text).as_bytes())?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_fixed_width_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.log");

        let mut log = ActivityLog::open(&path).unwrap();
        log.log("hello").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().next().unwrap();
        // "[HH:MM:SS] hello"
        assert_eq!(line.len(), "[00:00:00] hello".len());
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[3..4], ":");
        assert_eq!(&line[6..7], ":");
        assert_eq!(&line[9..11], "] ");
        assert_eq!(&line[11..], "hello");
    }

    #[test]
    fn writes_are_pure_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.log");

        let mut log = ActivityLog::open(&path).unwrap();
        log.log("first").unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        log.log("second").unwrap();
        let after = std::fs::read_to_string(&path).unwrap();

        assert!(after.starts_with(&before));
        assert!(after.ends_with("second\n"));
        assert_eq!(after.lines().count(), 2);
    }

    #[test]
    fn reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.log");

        {
            let mut log = ActivityLog::open(&path).unwrap();
            log.log("from first session").unwrap();
        }
        {
            let mut log = ActivityLog::open(&path).unwrap();
            log.log("from second session").unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("from first session"));
        assert!(content.contains("from second session"));
    }

    #[test]
    fn open_fails_for_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as an append-mode file.
        assert!(ActivityLog::open(dir.path()).is_err());
    }
}
