//! Output helpers shared by the CLI and the summary renderer.

pub mod colors;
pub mod format;

pub use colors::*;
pub use format::*;
