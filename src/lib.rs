//! Point-in-time health snapshots for TrueNAS storage appliances.
//!
//! Each run launches the platform's diagnostic tools concurrently, parses
//! their output and assembles a single [`snapshot::Snapshot`]. A failing or
//! hung tool only removes its own field from the result.

pub mod collectors;
pub mod config;
pub mod parsers;
pub mod snapshot;
