//! Read-side queries over ingested resources.

pub mod dependencies;
pub mod raw;
