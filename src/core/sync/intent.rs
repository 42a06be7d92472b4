use std::fmt;
use std::path::{Path, PathBuf};

/// Local asset folders kept in sync with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetFolder {
    Mods,
    ResourcePacks,
    ShaderPacks,
}

impl AssetFolder {
    /// Processing order of a run.
    pub const ALL: [AssetFolder; 3] = [
        AssetFolder::Mods,
        AssetFolder::ResourcePacks,
        AssetFolder::ShaderPacks,
    ];

    /// Directory name, both under the game directory and on the server.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetFolder::Mods => "mods",
            AssetFolder::ResourcePacks => "resourcepacks",
            AssetFolder::ShaderPacks => "shaderpacks",
        }
    }
}

impl fmt::Display for AssetFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// What the server wants done with an entry, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetIntent {
    /// `.jar`, `.bak`, `.zip`: make sure the asset is present.
    Install,
    /// `.rem`: retract the `.jar`/`.zip` of the same base name.
    Remove,
    /// Any other extension. Reserved, never an error.
    Ignored,
}

impl AssetIntent {
    /// Case-sensitive, extension given without the dot.
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("jar" | "bak" | "zip") => AssetIntent::Install,
            Some("rem") => AssetIntent::Remove,
            _ => AssetIntent::Ignored,
        }
    }
}

/// One remote-declared item of a folder, alive for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub name: String,
    pub folder: AssetFolder,
    pub extension: Option<String>,
}

impl AssetEntry {
    /// Accept a decoded remote name.
    ///
    /// Returns `None` for names that could resolve outside the folder:
    /// anything starting with `..`, containing a path separator, or empty.
    /// Directory entries (`sub/`) are dropped by the same rule.
    pub fn from_remote(folder: AssetFolder, name: &str) -> Option<Self> {
        if name.is_empty()
            || name.starts_with("..")
            || name.contains(['/', '\\'])
            || name == "."
        {
            return None;
        }

        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        Some(Self {
            name: name.to_string(),
            folder,
            extension,
        })
    }

    pub fn intent(&self) -> AssetIntent {
        AssetIntent::from_extension(self.extension.as_deref())
    }

    /// Local paths this entry touches under `base_dir`.
    pub fn paths(&self, base_dir: &Path) -> AssetPaths {
        let local = base_dir.join(self.folder.dir_name()).join(&self.name);
        AssetPaths {
            jar: local.with_extension("jar"),
            zip: local.with_extension("zip"),
            bak: local.with_extension("bak"),
            local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// `base_dir/folder/name`
    pub local: PathBuf,
    /// `local` with its extension replaced by `.jar`
    pub jar: PathBuf,
    /// `local` with its extension replaced by `.zip`
    pub zip: PathBuf,
    /// `local` with its extension replaced by `.bak`, the pinned form
    pub bak: PathBuf,
}

/// What the local filesystem holds for one entry, probed per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAssetState {
    pub path: PathBuf,
    pub exists: bool,
    /// Byte length, only meaningful when `exists`.
    pub length: u64,
}

impl LocalAssetState {
    pub fn absent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exists: false,
            length: 0,
        }
    }
}

/// Outcome of comparing a local file against the server's reported length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Absent,
    Fresh,
    Stale,
    /// The remote length could not be determined; the file is kept.
    Unknown,
}

/// Decide staleness from the probe and the remote length (if it was
/// obtainable). A length mismatch is the only staleness signal.
pub fn staleness(local: &LocalAssetState, remote_length: Option<u64>) -> Staleness {
    if !local.exists {
        return Staleness::Absent;
    }
    match remote_length {
        Some(len) if len != local.length => Staleness::Stale,
        Some(_) => Staleness::Fresh,
        None => Staleness::Unknown,
    }
}

/// Which of an entry's candidate paths exist, observed after the
/// staleness step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub local: bool,
    pub jar: bool,
    pub zip: bool,
    pub bak: bool,
}

impl Presence {
    fn any_installed(&self) -> bool {
        self.local || self.jar || self.zip || self.bak
    }
}

/// Side effect chosen for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetAction {
    Download,
    Delete(Vec<PathBuf>),
    Skip,
}

/// Pure dispatch from intent and presence to the action to perform.
///
/// Any one of the name, its `.jar`, `.zip` or `.bak` counts as installed.
/// A user renaming `x.jar` to `x.bak` pins that copy: it is neither
/// replaced nor retracted.
pub fn plan_action(intent: AssetIntent, paths: &AssetPaths, presence: Presence) -> AssetAction {
    match intent {
        AssetIntent::Install if !presence.any_installed() => AssetAction::Download,
        AssetIntent::Remove if presence.jar || presence.zip => {
            let mut doomed = Vec::new();
            if presence.jar {
                doomed.push(paths.jar.clone());
            }
            if presence.zip {
                doomed.push(paths.zip.clone());
            }
            AssetAction::Delete(doomed)
        }
        _ => AssetAction::Skip,
    }
}
