//! CLI command implementations

pub(crate) mod common;
pub(crate) mod mirror;
pub(crate) mod prune;
pub(crate) mod recover;
pub(crate) mod status;
pub(crate) mod sync;
pub(crate) mod up;
