pub mod session;
pub mod settings;

pub use session::SessionContext;
pub use settings::{Settings, SettingsFile, SettingsOverrides};
