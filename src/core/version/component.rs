use std::fmt;

use semver::{BuildMetadata, Version};

use crate::core::error::{UpdaterError, UpdaterResult};

/// A version value from the server's version table.
///
/// Accepts 2 to 4 numeric parts (`1.20`, `47.2.0`, `1.0.0.0`). The text is
/// kept verbatim because it is spliced into remote paths and loader ids; the
/// parsed [`Version`] is only used for ordering. A fourth part is carried as
/// build metadata and compared numerically, a missing one reads as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentVersion {
    raw: String,
    version: Version,
}

impl ComponentVersion {
    pub fn parse(component: &str, value: &str) -> UpdaterResult<Self> {
        let invalid = || UpdaterError::InvalidVersion {
            component: component.to_string(),
            value: value.to_string(),
        };

        let raw = value.trim();
        let parts = raw
            .split('.')
            .map(|p| p.parse::<u64>().map_err(|_| invalid()))
            .collect::<UpdaterResult<Vec<_>>>()?;

        if !(2..=4).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut version = Version::new(parts[0], parts[1], parts.get(2).copied().unwrap_or(0));
        if let Some(revision) = parts.get(3) {
            version.build = BuildMetadata::new(&revision.to_string()).map_err(|_| invalid())?;
        }

        Ok(Self {
            raw: raw.to_string(),
            version,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when this version orders after `other`, so `1.2.0.0` and
    /// `1.2.0` are the same release.
    pub fn is_newer_than(&self, other: &Version) -> bool {
        ordering_key(&self.version) > ordering_key(other)
    }
}

fn ordering_key(version: &Version) -> (u64, u64, u64, u64) {
    let revision = version.build.as_str().parse().unwrap_or(0);
    (version.major, version.minor, version.patch, revision)
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
