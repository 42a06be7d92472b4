use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::model::Profile;
use crate::core::error::{UpdaterError, UpdaterResult};

/// Profile files in the order they are probed. The first one present wins.
const PROFILE_FILES: [&str; 3] = [
    "launcher_profiles.json",
    "launcher_profiles_microsoft_store.json",
    TLAUNCHER_PROFILES,
];
const TLAUNCHER_PROFILES: &str = "TlauncherProfiles.json";
const TLAUNCHER_ADDITIONAL: &str = "TLauncherAdditional.json";

#[derive(Debug, Deserialize)]
struct LauncherProfilesFile {
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Reads launcher profiles out of a game directory.
pub struct ProfileStore {
    game_path: PathBuf,
}

impl ProfileStore {
    pub fn new(game_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
        }
    }

    /// Load the profile map from the first launcher file found.
    ///
    /// Fails with [`UpdaterError::NoProfileFile`] when no known file exists
    /// or the one found yields no profiles.
    pub async fn load(&self) -> UpdaterResult<BTreeMap<String, Profile>> {
        for file_name in PROFILE_FILES {
            let path = self.game_path.join(file_name);
            if !path.exists() {
                continue;
            }

            debug!("Reading launcher profiles from {:?}", path);
            let profiles = if file_name == TLAUNCHER_PROFILES {
                self.load_tlauncher().await?
            } else {
                load_launcher_profiles(&path).await?
            };

            info!("Loaded {} launcher profiles from {}", profiles.len(), file_name);
            if profiles.is_empty() {
                break;
            }
            return Ok(profiles);
        }

        Err(UpdaterError::NoProfileFile(self.game_path.clone()))
    }

    /// TLauncher keeps no profile list of its own; each installed modpack
    /// version carries a `TLauncherAdditional.json` that a profile is
    /// synthesized from.
    async fn load_tlauncher(&self) -> UpdaterResult<BTreeMap<String, Profile>> {
        let versions_dir = self.game_path.join("versions");
        let mut profiles = BTreeMap::new();

        let mut entries = tokio::fs::read_dir(&versions_dir)
            .await
            .map_err(|e| UpdaterError::io(&versions_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| UpdaterError::io(&versions_dir, e))?
        {
            let folder = entry.path();
            let additional = folder.join(TLAUNCHER_ADDITIONAL);
            if !folder.is_dir() || !additional.exists() {
                continue;
            }

            let json = match tokio::fs::read_to_string(&additional).await {
                Ok(json) => json,
                Err(e) => {
                    warn!("Cannot read {:?}: {}", additional, e);
                    continue;
                }
            };
            match tlauncher_profile(&json, &folder) {
                Ok(profile) => {
                    profiles.insert(profile.name.clone(), profile);
                }
                Err(e) => warn!("Skipping {:?}: {}", additional, e),
            }
        }

        Ok(profiles)
    }
}

async fn load_launcher_profiles(path: &Path) -> UpdaterResult<BTreeMap<String, Profile>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| UpdaterError::io(path, e))?;
    let file: LauncherProfilesFile = serde_json::from_str(&json)?;
    Ok(file.profiles)
}

/// Build a profile from a TLauncher modpack descriptor.
fn tlauncher_profile(json: &str, folder: &Path) -> UpdaterResult<Profile> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let field = |pointer: &str| -> UpdaterResult<String> {
        value
            .pointer(pointer)
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| UpdaterError::Other(format!("missing field {pointer}")))
    };

    let name = field("/modpack/name")?;
    let jar = field("/jar")?;
    let version_type = field("/modpack/version/minecraftVersionTypes/0/name")?;
    let version_name = field("/modpack/version/minecraftVersionName/name")?;

    let mut last_version_id = String::new();
    if version_type.contains("fabric") {
        last_version_id = format!("fabric-loader-{}-{}", version_name, jar).to_lowercase();
    }
    if version_type.contains("forge") {
        last_version_id = format!("{}-forge-{}", jar, version_name).to_lowercase();
    }

    let now = Utc::now();
    Ok(Profile {
        name,
        game_dir: Some(folder.to_path_buf()),
        last_version_id,
        created: Some(now),
        last_used: Some(now),
        icon: None,
        profile_type: Some("custom".into()),
    })
}

/// Profiles whose name matches `name` (case-insensitive), newest first.
/// Profiles without a creation time sort last.
pub fn select_profiles(profiles: &BTreeMap<String, Profile>, name: &str) -> Vec<Profile> {
    let wanted = name.to_lowercase();
    let mut matching: Vec<Profile> = profiles
        .values()
        .filter(|p| p.name.to_lowercase() == wanted)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.created.cmp(&a.created));
    matching
}
