// ─── Reconciliation Engine ───
// Makes one local asset folder match what the server declares for it.
// Entries are handled strictly in order, one at a time; a failing entry is
// recorded and the pass moves on. Every action is idempotent, so a pass can
// simply be re-run after a partial failure.

use std::path::Path;

use tracing::{debug, error, info, warn};

use super::intent::{plan_action, staleness, AssetAction, AssetEntry, AssetFolder, Staleness};
use super::probe::{presence, probe, remove_file};
use super::source::AssetSource;
use crate::core::error::{UpdaterError, UpdaterResult};

/// Terminal state of one entry within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    Installed,
    Removed,
    Skipped,
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub name: String,
    pub state: EntryState,
    /// A local copy with the wrong length was deleted before dispatch.
    pub replaced_stale: bool,
}

/// Result of reconciling one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub folder: AssetFolder,
    pub outcomes: Vec<EntryOutcome>,
    /// Remote names dropped before processing (traversal, directories).
    pub rejected: Vec<String>,
    /// Set when the folder listing itself could not be fetched.
    pub listing_error: Option<String>,
}

impl FolderReport {
    fn new(folder: AssetFolder) -> Self {
        Self {
            folder,
            outcomes: Vec::new(),
            rejected: Vec::new(),
            listing_error: None,
        }
    }

    fn count(&self, pred: impl Fn(&EntryState) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.state)).count()
    }

    pub fn installed(&self) -> usize {
        self.count(|s| *s == EntryState::Installed)
    }

    pub fn removed(&self) -> usize {
        self.count(|s| *s == EntryState::Removed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| *s == EntryState::Skipped)
    }

    pub fn errored(&self) -> usize {
        self.count(|s| matches!(s, EntryState::Errored(_)))
    }

    /// Files written or deleted by this pass, stale deletions included.
    pub fn mutations(&self) -> usize {
        self.installed()
            + self.removed()
            + self
                .outcomes
                .iter()
                .filter(|o| o.replaced_stale && o.state != EntryState::Installed)
                .count()
    }

    pub fn is_clean(&self) -> bool {
        self.listing_error.is_none() && self.errored() == 0
    }
}

/// Progress hooks for presenting a pass. All methods default to no-ops.
pub trait SyncListener: Send + Sync {
    fn folder_started(&self, _folder: AssetFolder) {}
    fn folder_failed(&self, _folder: AssetFolder, _error: &UpdaterError) {}
    fn entry_started(&self, _entry: &AssetEntry, _action: &AssetAction) {}
    fn entry_finished(&self, _entry: &AssetEntry, _state: &EntryState) {}
}

/// Drives reconciliation passes against an [`AssetSource`].
pub struct Reconciler<'a, S: AssetSource + ?Sized> {
    source: &'a S,
    listener: Option<&'a dyn SyncListener>,
}

impl<'a, S: AssetSource + ?Sized> Reconciler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: &'a dyn SyncListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// List and reconcile each folder in turn under `base_dir`. A folder
    /// whose listing fails gets an errored report; later folders still run.
    pub async fn sync_folders(&self, base_dir: &Path, folders: &[AssetFolder]) -> Vec<FolderReport> {
        let mut reports = Vec::with_capacity(folders.len());

        for &folder in folders {
            if let Some(listener) = self.listener {
                listener.folder_started(folder);
            }

            let report = match self.source.list_files(folder).await {
                Ok(names) => self.reconcile(folder, &names, base_dir).await,
                Err(e) => {
                    error!("Listing {} failed: {}", folder, e);
                    if let Some(listener) = self.listener {
                        listener.folder_failed(folder, &e);
                    }
                    let mut report = FolderReport::new(folder);
                    report.listing_error = Some(e.to_string());
                    report
                }
            };
            reports.push(report);
        }

        reports
    }

    /// Reconcile `base_dir/folder` against the decoded remote names.
    pub async fn reconcile(
        &self,
        folder: AssetFolder,
        remote_names: &[String],
        base_dir: &Path,
    ) -> FolderReport {
        let mut report = FolderReport::new(folder);

        for name in remote_names {
            let Some(entry) = AssetEntry::from_remote(folder, name) else {
                debug!("Ignoring remote entry {:?} in {}", name, folder);
                report.rejected.push(name.clone());
                continue;
            };

            let (state, replaced_stale) = match self.reconcile_entry(&entry, base_dir).await {
                Ok(result) => result,
                Err(e) => {
                    error!("{}/{}: {}", folder, entry.name, e);
                    (EntryState::Errored(e.to_string()), false)
                }
            };

            if let Some(listener) = self.listener {
                listener.entry_finished(&entry, &state);
            }
            report.outcomes.push(EntryOutcome {
                name: entry.name,
                state,
                replaced_stale,
            });
        }

        info!(
            "{}: {} installed, {} removed, {} skipped, {} errors",
            folder,
            report.installed(),
            report.removed(),
            report.skipped(),
            report.errored()
        );
        report
    }

    async fn reconcile_entry(
        &self,
        entry: &AssetEntry,
        base_dir: &Path,
    ) -> UpdaterResult<(EntryState, bool)> {
        let paths = entry.paths(base_dir);

        // Staleness runs before dispatch, whatever the intent.
        let local = probe(&paths.local).await?;
        let remote_length = if local.exists {
            match self.source.remote_length(entry.folder, &entry.name).await {
                Ok(len) => Some(len),
                Err(e) => {
                    warn!(
                        "Cannot check {}/{} against the server, keeping it: {}",
                        entry.folder, entry.name, e
                    );
                    None
                }
            }
        } else {
            None
        };

        let replaced_stale = staleness(&local, remote_length) == Staleness::Stale;
        if replaced_stale {
            info!(
                "{}/{} is stale (local {} bytes, remote {:?}), replacing",
                entry.folder, entry.name, local.length, remote_length
            );
            remove_file(&paths.local).await?;
        }

        let action = plan_action(entry.intent(), &paths, presence(&paths).await?);
        if action != AssetAction::Skip {
            if let Some(listener) = self.listener {
                listener.entry_started(entry, &action);
            }
        }

        let state = match action {
            AssetAction::Download => {
                self.source
                    .download(entry.folder, &entry.name, &paths.local)
                    .await?;
                info!("Installed {}/{}", entry.folder, entry.name);
                EntryState::Installed
            }
            AssetAction::Delete(doomed) => {
                for path in &doomed {
                    remove_file(path).await?;
                }
                info!("Removed {}/{} ({} files)", entry.folder, entry.name, doomed.len());
                EntryState::Removed
            }
            AssetAction::Skip => {
                debug!("{}/{} already satisfied", entry.folder, entry.name);
                EntryState::Skipped
            }
        };

        Ok((state, replaced_stale))
    }
}
