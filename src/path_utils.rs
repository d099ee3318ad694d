//! Path utilities for safe artifact naming and scoped scratch storage.
//!
//! This module owns the pieces of the naming contract that are shared by all
//! handlers: title sanitization, short identifier generation, the filesystem
//! collision guard, and the note-scoped scratch directory used for transient
//! files.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rand::Rng;

use crate::error::Result;
use crate::runlog::RunLog;

/// Alphabet for note identifiers: uppercase letters and digits.
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a short random identifier such as `"A3B9K2"`.
///
/// Drawn uniformly with replacement from a 36-symbol alphabet using a
/// non-cryptographic source. Collisions are possible and are not checked
/// here; [`dedup_path`] is the actual safety net.
pub fn new_note_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Makes a note title safe for filesystem use.
///
/// Every path separator becomes `-`, and runs of `-` collapse to a single
/// dash so substituted separators don't stack up against existing ones.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_dash = false;
    for c in title.chars() {
        let mapped = match c {
            '/' | '\\' => '-',
            c => c,
        };
        if mapped == '-' {
            if !last_dash {
                out.push('-');
            }
            last_dash = true;
        } else {
            out.push(mapped);
            last_dash = false;
        }
    }
    out
}

/// Ensures a unique target path by appending `_1`, `_2`, … before the
/// extension until an unused name is found.
///
/// Every substitution is recorded as a collision warning in the run log.
/// Applied to every artifact path the migration produces.
pub fn dedup_path(base: &Path, log: &mut RunLog) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }

    let parent = base.parent().unwrap_or_else(|| Path::new(""));
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1usize;
    loop {
        let candidate = parent.join(format!("{stem}_{counter}{suffix}"));
        if !candidate.exists() {
            log.warn_collision(
                &base.file_name().unwrap_or_default().to_string_lossy(),
                &candidate.file_name().unwrap_or_default().to_string_lossy(),
            );
            return candidate;
        }
        counter += 1;
    }
}

/// A hidden scratch directory scoped to one note's processing.
///
/// Transient files are registered through [`claim`](Self::claim); when the
/// scratch goes out of scope every claimed file that still exists is removed
/// and the directory itself is removed iff it ended up empty. Cleanup
/// failures are logged at debug level and never escalated, since they must not
/// mask the primary operation's outcome. Files that were renamed to their
/// final location before the drop are simply no longer present and are left
/// alone.
#[derive(Debug)]
pub struct ScratchDir {
    dir: PathBuf,
    claimed: Vec<PathBuf>,
}

impl ScratchDir {
    /// Creates (or reuses) a hidden scratch subdirectory under `parent`.
    pub fn create(parent: &Path, label: &str) -> Result<Self> {
        let dir = parent.join(format!(".ikou-{label}"));
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            claimed: Vec::new(),
        })
    }

    /// The scratch directory itself.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Registers a transient file name and returns its full path. The file
    /// is not created; it is merely owned by this scratch from now on.
    pub fn claim(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        self.claimed.push(path.clone());
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        for path in &self.claimed {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    debug!("leaving scratch file {} behind: {e}", path.display());
                }
            }
        }
        // remove_dir refuses non-empty directories, which is exactly the
        // "removed iff empty" contract
        if let Err(e) = fs::remove_dir(&self.dir) {
            debug!("scratch dir {} not removed: {e}", self.dir.display());
        }
    }
}
