pub mod component;
pub mod manifest;

pub use component::ComponentVersion;
pub use manifest::VersionTable;
