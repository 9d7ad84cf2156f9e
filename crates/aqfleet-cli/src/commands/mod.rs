//! Subcommand implementations.

pub(crate) mod best;
pub(crate) mod combine;
pub(crate) mod predict;
