// ─── Run Orchestrator ───
// connect → fetch profile data → locate game → check updater version →
// load launcher profiles → for each matching profile: servers.dat,
// options.txt, then one reconciliation pass per asset folder.
//
// Cancellation is only observed between these phases.

use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::connect::{connect_with_backoff, server_reachable, MAX_ATTEMPTS, RETRY_STEP};
use crate::core::downloader::Downloader;
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::options::merge_options_file;
use crate::core::profile::{select_profiles, Profile, ProfileStore};
use crate::core::state::session::{parse_server_url, profile_url};
use crate::core::state::settings::expand_path;
use crate::core::state::{SessionContext, Settings};
use crate::core::sync::{AssetFolder, FolderReport, HttpAssetSource, Reconciler};
use crate::core::ui::ConsoleUi;
use crate::core::version::VersionTable;

const SERVERS_FILE: &str = "servers.dat";
const OPTIONS_FILE: &str = "options.txt";

/// Whether a profile may be reconciled against the server's versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCheck {
    Ready {
        version_path: String,
    },
    Mismatch {
        expected: String,
        actual: String,
        installer_url: Option<String>,
    },
}

/// Compare a profile's installed loader with what the server expects.
pub fn check_profile(versions: &VersionTable, profile: &Profile) -> UpdaterResult<ProfileCheck> {
    let expected = versions.expected_loader_id()?.unwrap_or_default();
    let mismatch = || ProfileCheck::Mismatch {
        expected: expected.clone(),
        actual: profile.last_version_id.clone(),
        installer_url: versions.loader_installer_url(),
    };

    if profile.last_version_id != expected {
        return Ok(mismatch());
    }
    match profile.toolchain() {
        Some(toolchain) => Ok(ProfileCheck::Ready {
            version_path: versions.version_path(toolchain)?,
        }),
        None => Ok(mismatch()),
    }
}

/// Fail when the server asks for a newer updater than this one.
pub fn check_updater_version(versions: &VersionTable, releases_url: &str) -> UpdaterResult<()> {
    let current = semver::Version::parse(env!("CARGO_PKG_VERSION"))
        .map_err(|e| UpdaterError::Other(format!("invalid package version: {e}")))?;
    match versions.required_updater(&current) {
        Some(required) => Err(UpdaterError::UpdaterOutdated {
            required: required.to_string(),
            url: releases_url.to_string(),
        }),
        None => Ok(()),
    }
}

/// Download the server's options file into a private scratch directory and
/// merge it into `local`. The scratch directory is removed on every exit path.
pub async fn apply_remote_options(
    downloader: &Downloader,
    url: &Url,
    local: &Path,
    cancel: Option<&CancellationToken>,
) -> UpdaterResult<()> {
    let scratch = tempfile::Builder::new()
        .prefix("minecraft-updater-")
        .tempdir()
        .map_err(|e| UpdaterError::io(std::env::temp_dir(), e))?;
    let remote = scratch.path().join(OPTIONS_FILE);

    downloader.download_file(url, &remote, cancel).await?;
    merge_options_file(&remote, local).await
}

/// What a run did, for logging and exit status.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub profiles_processed: usize,
    /// Set when a profile's loader did not match and the run stopped there.
    pub stopped_on_mismatch: bool,
    pub reports: Vec<FolderReport>,
}

pub struct Orchestrator<'a> {
    settings: &'a Settings,
    downloader: Downloader,
    ui: &'a ConsoleUi,
    cancel: CancellationToken,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        downloader: Downloader,
        ui: &'a ConsoleUi,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            settings,
            downloader,
            ui,
            cancel,
        }
    }

    fn checkpoint(&self) -> UpdaterResult<()> {
        if self.cancel.is_cancelled() {
            return Err(UpdaterError::Cancelled);
        }
        Ok(())
    }

    pub async fn run(&self) -> UpdaterResult<RunSummary> {
        let server = parse_server_url(&self.settings.server)?;

        self.checkpoint()?;
        self.connect(&server).await?;

        self.checkpoint()?;
        let (versions, motd) = self.fetch_profile(&server).await?;

        self.checkpoint()?;
        let game_path = self.find_game()?;

        check_updater_version(&versions, &self.settings.releases_url)?;

        let session = SessionContext::new(
            server,
            self.settings.profile.clone(),
            versions,
            motd,
            game_path,
        );
        self.print_info(&session);

        let profiles = ProfileStore::new(session.game_path()).load().await?;
        let selected = select_profiles(&profiles, session.profile());
        if selected.is_empty() {
            return Err(UpdaterError::NoProfileFound(session.profile().to_string()));
        }

        let mut summary = RunSummary::default();
        for profile in &selected {
            self.checkpoint()?;

            let version_path = match check_profile(session.versions(), profile) {
                Ok(ProfileCheck::Ready { version_path }) => version_path,
                Ok(ProfileCheck::Mismatch {
                    expected,
                    actual,
                    installer_url,
                }) => {
                    self.report_mismatch(&session, profile, &expected, &actual, installer_url);
                    summary.stopped_on_mismatch = true;
                    break;
                }
                Err(e) => {
                    error!("Cannot validate profile {}: {}", profile.name, e);
                    self.ui.alert(&e.to_string());
                    summary.stopped_on_mismatch = true;
                    break;
                }
            };

            let reports = self.process_profile(&session, profile, &version_path).await?;
            summary.reports.extend(reports);
            summary.profiles_processed += 1;
        }

        info!(
            "Run finished: {} profiles, {} folder passes",
            summary.profiles_processed,
            summary.reports.len()
        );
        Ok(summary)
    }

    async fn connect(&self, server: &Url) -> UpdaterResult<()> {
        let client = self.downloader.client();
        let ui = self.ui;

        let reachable = connect_with_backoff(
            MAX_ATTEMPTS,
            RETRY_STEP,
            &self.cancel,
            |_| async move {
                ui.step("Connecting:");
                let up = server_reachable(client, server).await;
                if up {
                    ui.done();
                }
                up
            },
            |attempt, delay| {
                ui.failed();
                if let Some(delay) = delay {
                    warn!("Connection attempt {} failed", attempt);
                    ui.line(&format!("Retrying in {} seconds...", delay.as_secs()));
                }
            },
        )
        .await?;

        if reachable {
            Ok(())
        } else {
            Err(UpdaterError::ServerUnreachable(server.to_string()))
        }
    }

    async fn fetch_profile(&self, server: &Url) -> UpdaterResult<(VersionTable, Vec<String>)> {
        let profile = &self.settings.profile;
        self.ui.step("Getting profile...");

        let result = async {
            let versions = VersionTable::fetch(
                self.downloader.client(),
                profile_url(server, profile, "versions.json")?,
            )
            .await?;
            let motd = self
                .downloader
                .fetch_text(&profile_url(server, profile, "motd.txt")?)
                .await?;
            Ok::<_, UpdaterError>((versions, motd.lines().map(ToString::to_string).collect()))
        }
        .await;

        match result {
            Ok(data) => {
                self.ui.done();
                Ok(data)
            }
            Err(e) => {
                error!("Fetching profile {} failed: {}", profile, e);
                self.ui.error();
                Err(UpdaterError::ProfileFetch {
                    profile: profile.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn find_game(&self) -> UpdaterResult<PathBuf> {
        self.ui.step("Getting game path...");
        let path = self.settings.game_path.clone();
        if path.is_dir() {
            self.ui.done();
            Ok(path)
        } else {
            self.ui.failed();
            Err(UpdaterError::GamePathInvalid(path))
        }
    }

    fn print_info(&self, session: &SessionContext) {
        self.ui.blank();
        for line in session.motd() {
            self.ui.line(line);
        }
        self.ui.blank();
        for (component, version) in session.versions().iter() {
            debug!("Server version {} = {}", component, version);
        }
    }

    fn report_mismatch(
        &self,
        session: &SessionContext,
        profile: &Profile,
        expected: &str,
        actual: &str,
        installer_url: Option<String>,
    ) {
        warn!(
            "Profile {} is on {:?}, server expects {:?}; stopping",
            profile.name, actual, expected
        );
        self.ui.alert(&format!(
            "Profile '{}' ({}) must run '{}' but is on '{}'.",
            session.profile(),
            profile.name,
            expected,
            actual
        ));
        if let Some(url) = installer_url {
            self.ui.alert(&format!("Download the loader from: {url}"));
        }
    }

    async fn process_profile(
        &self,
        session: &SessionContext,
        profile: &Profile,
        version_path: &str,
    ) -> UpdaterResult<Vec<FolderReport>> {
        self.ui.highlight(&format!(
            "Profile: {} ({})",
            profile.name, profile.last_version_id
        ));

        let game_dir = profile
            .game_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(expand_path)
            .unwrap_or_else(|| session.game_path().to_path_buf());
        info!("Reconciling profile {} in {:?}", profile.name, game_dir);

        self.checkpoint()?;
        self.replace_servers(session, version_path, &game_dir).await;

        self.checkpoint()?;
        self.apply_options(session, version_path, &game_dir).await;

        self.checkpoint()?;
        self.ui.blank();
        let source = HttpAssetSource::new(&self.downloader, session, version_path.to_string());
        let reports = Reconciler::new(&source)
            .with_listener(self.ui)
            .sync_folders(&game_dir, &AssetFolder::ALL)
            .await;
        self.ui.blank();

        Ok(reports)
    }

    /// Best effort: any failure leaves the server list as it was.
    async fn replace_servers(&self, session: &SessionContext, version_path: &str, game_dir: &Path) {
        let target = game_dir.join(SERVERS_FILE);
        if target.exists() {
            self.ui.blank();
            if !self.ui.confirm("Replace the server list") {
                return;
            }
        }

        let result = async {
            let url = session.downloads_url(version_path, &[SERVERS_FILE])?;
            self.downloader
                .download_file(&url, &target, Some(&self.cancel))
                .await
        }
        .await;

        match result {
            Ok(()) => info!("Replaced {:?}", target),
            Err(e) => debug!("{} not replaced: {}", SERVERS_FILE, e),
        }
    }

    /// Best effort: any failure leaves options.txt as it was.
    async fn apply_options(&self, session: &SessionContext, version_path: &str, game_dir: &Path) {
        let target = game_dir.join(OPTIONS_FILE);
        if !target.exists() {
            return;
        }
        self.ui.blank();
        if !self.ui.confirm("Apply the recommended options") {
            return;
        }

        let result = async {
            let url = session.downloads_url(version_path, &[OPTIONS_FILE])?;
            apply_remote_options(&self.downloader, &url, &target, Some(&self.cancel)).await
        }
        .await;

        match result {
            Ok(()) => info!("Merged recommended options into {:?}", target),
            Err(e) => debug!("{} not merged: {}", OPTIONS_FILE, e),
        }
    }
}
