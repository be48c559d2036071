// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Per-profile session tags.
//!
//! A tag is created the first time it is asked for and persisted to a file, so every later
//! run on the same profile tags its sample requests the same way.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::info;

/// Characters used for the random part of a tag.
const TAG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of a tag.
const TAG_RANDOM_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An opaque identifier attached to every sample request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionTag(String);

impl SessionTag {
    pub fn new(tag: impl Into<String>) -> SessionTag {
        SessionTag(tag.into())
    }

    /// Generates a new random tag in the form `sess-<random>-<unix millis>`.
    pub fn generate() -> SessionTag {
        let mut rng = rand::thread_rng();
        let random: String = (0..TAG_RANDOM_LEN)
            .map(|_| TAG_ALPHABET[rng.gen_range(0..TAG_ALPHABET.len())] as char)
            .collect();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        SessionTag(format!("sess-{}-{}", random, millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stores the session tag in a file.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> SessionStore {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored tag, creating and persisting a new one if there is none yet.
    pub fn session_tag(&self) -> Result<SessionTag, SessionError> {
        let io_error = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(session = trimmed, "Existing session");
                    return Ok(SessionTag::new(trimmed));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(e)),
        }

        let tag = SessionTag::generate();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        fs::write(&self.path, tag.as_str()).map_err(io_error)?;
        info!(session = %tag, path = ?self.path, "New session created");
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tag_format() {
        let tag = SessionTag::generate();
        let parts: Vec<&str> = tag.as_str().splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sess");
        assert_eq!(parts[1].len(), TAG_RANDOM_LEN);
        assert!(parts[1]
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        assert!(parts[2].parse::<u128>().is_ok());
    }

    #[test]
    fn test_generated_tags_differ() {
        assert_ne!(SessionTag::generate(), SessionTag::generate());
    }

    #[test]
    fn test_tag_is_stable_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session");

        let first = SessionStore::new(&path).session_tag().unwrap();
        let second = SessionStore::new(&path).session_tag().unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&path).unwrap(), first.as_str());
    }

    #[test]
    fn test_existing_tag_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        fs::write(&path, "sess-abc-123\n").unwrap();

        let tag = SessionStore::new(&path).session_tag().unwrap();
        assert_eq!(tag.as_str(), "sess-abc-123");
    }

    #[test]
    fn test_empty_file_gets_new_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        fs::write(&path, "   ").unwrap();

        let tag = SessionStore::new(&path).session_tag().unwrap();
        assert!(tag.as_str().starts_with("sess-"));
        assert_eq!(fs::read_to_string(&path).unwrap(), tag.as_str());
    }
}
