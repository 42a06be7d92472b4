pub mod model;
pub mod source;

pub use model::{Profile, Toolchain};
pub use source::{select_profiles, ProfileStore};
