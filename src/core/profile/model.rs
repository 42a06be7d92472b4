use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Mod loader family a profile runs on, derived from its version id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    Forge,
    Fabric,
}

impl Toolchain {
    /// Key of this toolchain in the server's version table.
    pub fn component_name(&self) -> &'static str {
        match self {
            Toolchain::Forge => "Forge",
            Toolchain::Fabric => "Fabric",
        }
    }

    /// Infer the toolchain from a launcher version id such as
    /// `1.20.1-forge-47.2.0` or `fabric-loader-0.14.21-1.20.1`.
    pub fn from_version_id(version_id: &str) -> Option<Self> {
        if version_id.contains("forge") {
            Some(Toolchain::Forge)
        } else if version_id.contains("fabric") {
            Some(Toolchain::Fabric)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.component_name())
    }
}

/// A launcher profile as stored in `launcher_profiles.json`.
///
/// Read once per run and never written back. The toolchain is not stored,
/// it is always recomputed from `last_version_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub game_dir: Option<PathBuf>,
    #[serde(default)]
    pub last_version_id: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "type")]
    pub profile_type: Option<String>,
}

impl Profile {
    pub fn toolchain(&self) -> Option<Toolchain> {
        Toolchain::from_version_id(&self.last_version_id)
    }
}

/// Launchers write timestamps in a few shapes; anything unreadable is
/// treated as missing instead of failing the whole profile file.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(|value| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
