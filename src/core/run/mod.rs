pub mod connect;
pub mod orchestrator;

pub use orchestrator::{apply_remote_options, check_profile, check_updater_version, Orchestrator, ProfileCheck, RunSummary};
