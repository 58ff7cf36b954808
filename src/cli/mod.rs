//! Terminal front-end helpers: colored status output and the confirmation
//! prompt required before destructive operations.

pub mod output;
pub mod prompt;
