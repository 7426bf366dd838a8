//! Per-target output directories with a duplicate-write guard.
//!
//! A [`StagingSession`] covers one linker run against one target directory.
//! A path can be opened once per session, and only when nothing exists at
//! it on disk; later requests are refused with a reason instead of failing.
//! Ending the session (explicitly or by dropping the guard) clears the
//! bookkeeping but leaves the directory contents in place.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{LinkError, LinkResult};
use crate::registry::is_valid_partial_path;

// ══════════════════════════════════════════════════════════════════════════════
// Buffers
// ══════════════════════════════════════════════════════════════════════════════

/// Bytes destined for one artifact path.
#[derive(Debug)]
pub struct ArtifactBuffer {
    partial_path: String,
    bytes: Vec<u8>,
    /// Session that opened this buffer; `0` for none.
    session: u64,
}

impl ArtifactBuffer {
    /// A buffer not tied to any session. Committing it fails.
    pub fn new(partial_path: impl Into<String>) -> Self {
        Self {
            partial_path: partial_path.into(),
            bytes: Vec::new(),
            session: 0,
        }
    }

    pub fn partial_path(&self) -> &str {
        &self.partial_path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn push_str(&mut self, text: &str) {
        self.bytes.extend_from_slice(text.as_bytes());
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

impl io::Write for ArtifactBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Why [`StagingSession::open`] declined a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// A file is already present at the path.
    ExistsOnDisk,
    /// A buffer for the path was already opened this session.
    AlreadyOpen,
    /// The path is empty, absolute, or escapes the target directory.
    InvalidPath,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExistsOnDisk => write!(f, "a file already exists at this path"),
            Self::AlreadyOpen => write!(f, "already opened in this session"),
            Self::InvalidPath => write!(f, "not a valid relative path"),
        }
    }
}

/// Result of [`StagingSession::open`].
#[derive(Debug)]
pub enum OpenOutcome {
    Opened(ArtifactBuffer),
    Refused(Refusal),
}

impl OpenOutcome {
    pub fn into_buffer(self) -> Option<ArtifactBuffer> {
        match self {
            Self::Opened(buffer) => Some(buffer),
            Self::Refused(_) => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ArtifactStagingArea
// ══════════════════════════════════════════════════════════════════════════════

/// Owner of the output root; hands out one session at a time.
#[derive(Debug)]
pub struct ArtifactStagingArea {
    root: PathBuf,
    state: SessionState,
    next_session: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    id: u64,
    dir: PathBuf,
    /// Opened and not yet committed.
    open: BTreeSet<String>,
    committed: BTreeSet<String>,
}

impl ArtifactStagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: SessionState::default(),
            next_session: 1,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Wipe and recreate `<root>/<target>` and start a session on it.
    /// `target` must be a valid partial path; nothing on disk is touched
    /// otherwise.
    pub fn begin(&mut self, target: &str) -> LinkResult<StagingSession<'_>> {
        if !is_valid_partial_path(target) {
            return Err(LinkError::InvalidTarget {
                target: target.to_string(),
            });
        }
        let dir = self.root.join(target);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| LinkError::io(&dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| LinkError::io(&dir, e))?;

        let id = self.next_session;
        self.next_session += 1;
        self.state = SessionState {
            id,
            dir,
            ..SessionState::default()
        };
        debug!(target, session = id, "began staging session");
        Ok(StagingSession { area: self })
    }

    fn end(&mut self) {
        if self.state.id != 0 {
            debug!(
                session = self.state.id,
                committed = self.state.committed.len(),
                abandoned = self.state.open.len(),
                "ended staging session"
            );
        }
        self.state = SessionState::default();
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// StagingSession
// ══════════════════════════════════════════════════════════════════════════════

/// One linker run's view of its target directory. Dropping it ends the
/// session.
#[derive(Debug)]
pub struct StagingSession<'a> {
    area: &'a mut ArtifactStagingArea,
}

impl StagingSession<'_> {
    /// The target directory.
    pub fn dir(&self) -> &Path {
        &self.area.state.dir
    }

    /// Open a buffer for `partial_path` unless it exists on disk or was
    /// already opened in this session.
    pub fn open(&mut self, partial_path: &str) -> OpenOutcome {
        let state = &mut self.area.state;
        let refusal = if !is_valid_partial_path(partial_path) {
            Some(Refusal::InvalidPath)
        } else if state.open.contains(partial_path) {
            Some(Refusal::AlreadyOpen)
        } else if state.dir.join(partial_path).exists() {
            Some(Refusal::ExistsOnDisk)
        } else {
            None
        };
        if let Some(reason) = refusal {
            debug!(partial_path, %reason, "refused artifact");
            return OpenOutcome::Refused(reason);
        }
        state.open.insert(partial_path.to_string());
        trace!(partial_path, "opened artifact");
        OpenOutcome::Opened(ArtifactBuffer {
            partial_path: partial_path.to_string(),
            bytes: Vec::new(),
            session: state.id,
        })
    }

    /// Write `buffer` to its path and clear it.
    pub fn commit(&mut self, buffer: &mut ArtifactBuffer) -> LinkResult<()> {
        let state = &mut self.area.state;
        let path = buffer.partial_path.clone();
        if buffer.session != state.id || !state.open.contains(&path) {
            if buffer.session == state.id && state.committed.contains(&path) {
                return Err(LinkError::AlreadyCommitted { path });
            }
            return Err(LinkError::UnknownBuffer { path });
        }

        let file = state.dir.join(&path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|e| LinkError::io(parent, e))?;
        }
        fs::write(&file, &buffer.bytes).map_err(|e| LinkError::io(&file, e))?;
        trace!(partial_path = %path, bytes = buffer.bytes.len(), "committed artifact");

        buffer.bytes.clear();
        state.open.remove(&path);
        state.committed.insert(path);
        Ok(())
    }

    /// Paths committed so far, in order.
    pub fn committed(&self) -> impl Iterator<Item = &str> {
        self.area.state.committed.iter().map(String::as_str)
    }

    /// End the session now.
    pub fn end(self) {
        // dropping does the work
    }
}

impl Drop for StagingSession<'_> {
    fn drop(&mut self) {
        self.area.end();
    }
}
