//! Flat-file snapshot store
//!
//! One member per line, `<username> <identity_key>`, sorted by username and
//! newline-terminated. The file is always rewritten whole.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::{IdentityKey, Roster};
use crate::ports::SnapshotStore;

/// Snapshot stored as a plain text file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse snapshot text into a roster
pub fn parse_snapshot(content: &str) -> Result<Roster> {
    let mut roster = Roster::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[username, key] = fields.as_slice() else {
            return Err(Error::snapshot(format!(
                "line {}: expected '<username> <identity_key>', got '{}'",
                index + 1,
                line
            )));
        };

        let key: IdentityKey = key.parse().map_err(|_| {
            Error::snapshot(format!("line {}: invalid identity key '{}'", index + 1, key))
        })?;
        roster.insert(username, key);
    }

    Ok(roster)
}

/// Render a roster as snapshot text
pub fn render_snapshot(roster: &Roster) -> String {
    let mut out = String::new();
    for (username, key) in roster {
        out.push_str(username);
        out.push(' ');
        out.push_str(&key.to_string());
        out.push('\n');
    }
    out
}

impl SnapshotStore for SnapshotFile {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Roster> {
        let content = fs::read_to_string(&self.path)?;
        parse_snapshot(&content).map_err(|e| match e {
            Error::Snapshot(msg) => Error::snapshot(format!("{}: {}", self.path.display(), msg)),
            other => other,
        })
    }

    fn save(&self, roster: &Roster) -> Result<()> {
        // A symlinked snapshot updates its target, not the link
        let target = match fs::canonicalize(&self.path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.path.clone(),
            Err(e) => return Err(e.into()),
        };

        // Write next to the target so the final rename stays on one filesystem
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(render_snapshot(roster).as_bytes())?;
        if let Ok(existing) = fs::metadata(&target) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
