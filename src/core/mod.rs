// ─── Minecraft Updater Core ───
// Keeps a local Minecraft installation in line with a modpack server.
//
// Architecture:
//   core/
//     state/      - Settings file + CLI overrides, immutable session context
//     version/    - Server version table and component versions
//     profile/    - Launcher profile files and profile selection
//     downloader/ - Atomic single-file downloads and HEAD probes
//     sync/       - Folder listing parser + reconciliation engine
//     options/    - options.txt merge
//     run/        - Connect backoff and the end-to-end run
//     ui          - Console markers and prompts

pub mod downloader;
pub mod error;
pub mod http;
pub mod options;
pub mod profile;
pub mod run;
pub mod state;
pub mod sync;
pub mod ui;
pub mod version;
