// ─── Asset Reconciliation ───
//   intent   - folders, extension intents, pure action planning
//   listing  - directory index parsing and name decoding
//   probe    - local filesystem inspection
//   source   - remote side (trait + HTTP implementation)
//   engine   - sequential per-folder reconciliation passes

pub mod engine;
pub mod intent;
pub mod listing;
pub mod probe;
pub mod source;

pub use engine::{EntryOutcome, EntryState, FolderReport, Reconciler, SyncListener};
pub use intent::{AssetAction, AssetEntry, AssetFolder, AssetIntent};
pub use source::{AssetSource, HttpAssetSource};
