pub mod merge;

pub use merge::{escape_non_ascii, merge_options, merge_options_file};
