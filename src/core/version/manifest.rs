// ─── Version Table ───
// The server publishes `minecraft/profiles/{profile}/versions.json`, a flat
// object of component name → version (Minecraft, Forge, Fabric, Updater...).

use std::collections::BTreeMap;

use reqwest::Url;
use tracing::info;

use super::component::ComponentVersion;
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::profile::Toolchain;

pub const MINECRAFT: &str = "Minecraft";
pub const UPDATER: &str = "Updater";

const FABRIC_INSTALLER_URL: &str =
    "https://maven.fabricmc.net/net/fabricmc/fabric-installer/0.11.2/fabric-installer-0.11.2.jar";
const FORGE_MAVEN: &str = "https://maven.minecraftforge.net/net/minecraftforge/forge";

/// Component versions resolved from the server for one session.
///
/// Keys are whatever the server defines; every lookup returns an `Option`.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    components: BTreeMap<String, ComponentVersion>,
}

impl VersionTable {
    /// Fetch and parse the version table.
    pub async fn fetch(client: &reqwest::Client, url: Url) -> UpdaterResult<Self> {
        info!("Fetching version table from {}", url);

        let response = client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let table = Self::from_json(&response.text().await?)?;
        info!("Loaded {} component versions", table.components.len());
        Ok(table)
    }

    pub fn from_json(json: &str) -> UpdaterResult<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut components = BTreeMap::new();
        for (name, value) in raw {
            let text = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let version = ComponentVersion::parse(&name, &text)?;
            components.insert(name, version);
        }

        Ok(Self { components })
    }

    pub fn get(&self, component: &str) -> Option<&ComponentVersion> {
        self.components.get(component)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentVersion)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, component: &str) -> UpdaterResult<&ComponentVersion> {
        self.get(component)
            .ok_or_else(|| UpdaterError::MissingComponent(component.to_string()))
    }

    /// The launcher version id a profile must be on to match this table.
    ///
    /// Forge wins over Fabric when the server lists both. `None` when the
    /// table names no loader at all.
    pub fn expected_loader_id(&self) -> UpdaterResult<Option<String>> {
        let id = if let Some(forge) = self.get(Toolchain::Forge.component_name()) {
            format!("{}-forge-{}", self.require(MINECRAFT)?, forge)
        } else if let Some(fabric) = self.get(Toolchain::Fabric.component_name()) {
            format!("fabric-loader-{}-{}", fabric, self.require(MINECRAFT)?)
        } else {
            return Ok(None);
        };
        Ok(Some(id.to_lowercase()))
    }

    /// Where to get the loader installer matching this table.
    pub fn loader_installer_url(&self) -> Option<String> {
        if let (Some(minecraft), Some(forge)) = (
            self.get(MINECRAFT),
            self.get(Toolchain::Forge.component_name()),
        ) {
            return Some(format!(
                "{FORGE_MAVEN}/{minecraft}-{forge}/forge-{minecraft}-{forge}-installer.jar"
            ));
        }
        self.get(Toolchain::Fabric.component_name())
            .map(|_| FABRIC_INSTALLER_URL.to_string())
    }

    /// The remote asset set key, `{minecraft}-{toolchain}-{toolchainVersion}`.
    pub fn version_path(&self, toolchain: Toolchain) -> UpdaterResult<String> {
        let minecraft = self.require(MINECRAFT)?;
        let loader = self.require(toolchain.component_name())?;
        Ok(format!("{}-{}-{}", minecraft, toolchain, loader).to_lowercase())
    }

    /// The updater release the server asks for, when newer than `current`.
    pub fn required_updater(&self, current: &semver::Version) -> Option<&ComponentVersion> {
        self.get(UPDATER).filter(|v| v.is_newer_than(current))
    }
}
