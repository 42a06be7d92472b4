use std::path::PathBuf;

use clap::Parser;

use crate::core::state::SettingsOverrides;

#[derive(Debug, Parser)]
#[command(name = "minecraft-updater", version)]
#[command(about = "Sync mods, resource packs and shader packs with a modpack server")]
pub struct Cli {
    /// Settings file (defaults to appsettings.json next to the executable)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Modpack profile name
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Minecraft directory holding the launcher profiles
    #[arg(long, value_name = "DIR")]
    pub game_dir: Option<PathBuf>,

    /// Answer yes to every prompt
    #[arg(short, long, conflicts_with = "no")]
    pub yes: bool,

    /// Answer no to every prompt
    #[arg(short, long)]
    pub no: bool,

    /// Exit without waiting for a key press
    #[arg(long)]
    pub no_pause: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Fixed prompt answer, if one was given.
    pub fn assume(&self) -> Option<bool> {
        match (self.yes, self.no) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            server: self.server.clone(),
            profile: self.profile.clone(),
            game_path: self.game_dir.clone(),
        }
    }
}
