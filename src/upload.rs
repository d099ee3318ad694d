//! The upload collaborator, specified at its interface boundary.
//!
//! [`RemoteStore`] is the seam a cloud client implements: create a named
//! folder under a parent handle, upload a file into a folder. The crate
//! ships [`DirectoryStore`], which mirrors into a local directory (typically
//! a mounted sync folder); an authenticated cloud client is an out-of-crate
//! implementor of the same trait.
//!
//! [`upload_directory`] drives any store: it recursively recreates a local
//! directory's folder/file structure in the remote, preserving names and
//! nesting. Failure of an individual upload is counted and logged, never
//! escalated.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Opaque handle to a folder in a remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolderId(pub String);

/// The operations a remote file store must provide.
pub trait RemoteStore {
    /// Creates a folder named `name` under `parent` (or at the store root)
    /// and returns its handle.
    fn create_folder(
        &mut self,
        name: &str,
        parent: Option<&RemoteFolderId>,
    ) -> Result<RemoteFolderId>;

    /// Uploads the file at `local` into `parent` under `name`.
    fn upload_file(&mut self, local: &Path, name: &str, parent: &RemoteFolderId) -> Result<()>;
}

/// Counters for one upload run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub folders_created: usize,
    pub files_uploaded: usize,
    pub failures: usize,
}

/// Recursively mirrors `local_root` into the store.
///
/// The root folder is named after the directory itself and its creation is
/// the only fatal failure; everything below is best-effort. Hidden entries
/// (dot-prefixed) are skipped so scratch leftovers never travel.
pub fn upload_directory<S: RemoteStore>(store: &mut S, local_root: &Path) -> Result<UploadReport> {
    if !local_root.is_dir() {
        return Err(Error::NotFound(format!(
            "Upload source is not a directory: {:?}",
            local_root
        )));
    }

    let root_name = local_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let root_id = store.create_folder(&root_name, None)?;
    info!("mirroring {} as '{root_name}'", local_root.display());

    let mut folder_ids: HashMap<PathBuf, RemoteFolderId> = HashMap::new();
    folder_ids.insert(local_root.to_path_buf(), root_id);

    let mut report = UploadReport {
        folders_created: 1,
        ..Default::default()
    };

    let walker = WalkDir::new(local_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                report.failures += 1;
                continue;
            }
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let Some(parent_id) = path.parent().and_then(|p| folder_ids.get(p)).cloned() else {
            // parent folder creation failed earlier; nothing to attach to
            report.failures += 1;
            continue;
        };

        if entry.file_type().is_dir() {
            match store.create_folder(&name, Some(&parent_id)) {
                Ok(id) => {
                    folder_ids.insert(path.to_path_buf(), id);
                    report.folders_created += 1;
                }
                Err(e) => {
                    warn!("could not create remote folder '{name}': {e}");
                    report.failures += 1;
                }
            }
        } else {
            match store.upload_file(path, &name, &parent_id) {
                Ok(()) => report.files_uploaded += 1,
                Err(e) => {
                    warn!("could not upload '{name}': {e}");
                    report.failures += 1;
                }
            }
        }
    }

    info!(
        "mirror complete: {} folders, {} files, {} failures",
        report.folders_created, report.files_uploaded, report.failures
    );
    Ok(report)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// A [`RemoteStore`] backed by a local directory.
///
/// Folder handles are paths relative to the store root. Doubles as the test
/// double for the upload walker.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, parent: Option<&RemoteFolderId>, name: &str) -> PathBuf {
        match parent {
            Some(parent) => self.root.join(&parent.0).join(name),
            None => self.root.join(name),
        }
    }
}

impl RemoteStore for DirectoryStore {
    fn create_folder(
        &mut self,
        name: &str,
        parent: Option<&RemoteFolderId>,
    ) -> Result<RemoteFolderId> {
        let path = self.resolve(parent, name);
        fs::create_dir_all(&path)?;
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| Error::InvalidPath(path.clone(), "outside store root".to_string()))?;
        Ok(RemoteFolderId(relative.to_string_lossy().into_owned()))
    }

    fn upload_file(&mut self, local: &Path, name: &str, parent: &RemoteFolderId) -> Result<()> {
        fs::copy(local, self.root.join(&parent.0).join(name))?;
        Ok(())
    }
}
