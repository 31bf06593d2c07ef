//! Command-line interface.

pub mod args;
pub mod input;

pub use args::Args;
pub use input::{build_targets, parse_target_lines, read_target_file, TargetLine};
