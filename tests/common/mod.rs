#![allow(dead_code)]

pub mod http_server;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use updater_lib::core::error::{UpdaterError, UpdaterResult};
use updater_lib::core::sync::{
    AssetAction, AssetEntry, AssetFolder, AssetSource, EntryState, SyncListener,
};

/// In-memory server tree for driving reconciliation passes.
#[derive(Default)]
pub struct FakeSource {
    files: BTreeMap<(AssetFolder, String), Vec<u8>>,
    /// Declared in the listing but with nothing to serve.
    listed_only: Vec<(AssetFolder, String)>,
    failing_downloads: HashSet<String>,
    failing_lengths: bool,
    failing_listings: HashSet<AssetFolder>,
    pub downloads: Mutex<Vec<String>>,
    pub length_checks: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, folder: AssetFolder, name: &str, body: &[u8]) -> Self {
        self.files.insert((folder, name.to_string()), body.to_vec());
        self
    }

    /// A listing entry with no body, like a `.rem` marker or a hostile name.
    pub fn listed(mut self, folder: AssetFolder, name: &str) -> Self {
        self.listed_only.push((folder, name.to_string()));
        self
    }

    pub fn failing_download(mut self, name: &str) -> Self {
        self.failing_downloads.insert(name.to_string());
        self
    }

    pub fn failing_lengths(mut self) -> Self {
        self.failing_lengths = true;
        self
    }

    pub fn failing_listing(mut self, folder: AssetFolder) -> Self {
        self.failing_listings.insert(folder);
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetSource for FakeSource {
    async fn list_files(&self, folder: AssetFolder) -> UpdaterResult<Vec<String>> {
        if self.failing_listings.contains(&folder) {
            return Err(UpdaterError::DownloadFailed {
                url: format!("fake://{folder}/"),
                status: 500,
            });
        }
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter(|(f, _)| *f == folder)
            .map(|(_, name)| name.clone())
            .collect();
        names.extend(
            self.listed_only
                .iter()
                .filter(|(f, _)| *f == folder)
                .map(|(_, name)| name.clone()),
        );
        Ok(names)
    }

    async fn remote_length(&self, folder: AssetFolder, name: &str) -> UpdaterResult<u64> {
        self.length_checks.lock().unwrap().push(name.to_string());
        if self.failing_lengths {
            return Err(UpdaterError::Other("HEAD timed out".into()));
        }
        self.files
            .get(&(folder, name.to_string()))
            .map(|body| body.len() as u64)
            .ok_or_else(|| UpdaterError::DownloadFailed {
                url: format!("fake://{folder}/{name}"),
                status: 404,
            })
    }

    async fn download(&self, folder: AssetFolder, name: &str, dest: &Path) -> UpdaterResult<()> {
        self.downloads.lock().unwrap().push(name.to_string());
        if self.failing_downloads.contains(name) {
            return Err(UpdaterError::DownloadFailed {
                url: format!("fake://{folder}/{name}"),
                status: 503,
            });
        }
        let body = self
            .files
            .get(&(folder, name.to_string()))
            .ok_or_else(|| UpdaterError::DownloadFailed {
                url: format!("fake://{folder}/{name}"),
                status: 404,
            })?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(dest, body).unwrap();
        Ok(())
    }
}

/// Write a file under `base/folder`, creating the folder.
pub fn put(base: &Path, folder: AssetFolder, name: &str, body: &[u8]) {
    let dir = base.join(folder.dir_name());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), body).unwrap();
}

pub fn exists(base: &Path, folder: AssetFolder, name: &str) -> bool {
    base.join(folder.dir_name()).join(name).is_file()
}

/// Sorted file names currently in `base/folder`.
pub fn snapshot(base: &Path, folder: AssetFolder) -> Vec<(String, u64)> {
    let dir = base.join(folder.dir_name());
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut files: Vec<(String, u64)> = entries
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                e.metadata().unwrap().len(),
            )
        })
        .collect();
    files.sort();
    files
}

/// What a pass reported to its listener, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    FolderStarted(AssetFolder),
    FolderFailed(AssetFolder),
    Installing(String),
    Deleting(String),
    Finished(String, EntryState),
}

#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SyncListener for RecordingListener {
    fn folder_started(&self, folder: AssetFolder) {
        self.push(Event::FolderStarted(folder));
    }

    fn folder_failed(&self, folder: AssetFolder, _error: &UpdaterError) {
        self.push(Event::FolderFailed(folder));
    }

    fn entry_started(&self, entry: &AssetEntry, action: &AssetAction) {
        match action {
            AssetAction::Download => self.push(Event::Installing(entry.name.clone())),
            AssetAction::Delete(_) => self.push(Event::Deleting(entry.name.clone())),
            AssetAction::Skip => {}
        }
    }

    fn entry_finished(&self, entry: &AssetEntry, state: &EntryState) {
        self.push(Event::Finished(entry.name.clone(), state.clone()));
    }
}
