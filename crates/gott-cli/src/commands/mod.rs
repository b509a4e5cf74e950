//! CLI subcommand implementations.

pub mod annotate;
pub mod cancel;
pub mod edit;
pub mod resume;
pub mod start;
pub mod status;
pub mod stop;
pub mod summary;
pub mod track;
mod util;
