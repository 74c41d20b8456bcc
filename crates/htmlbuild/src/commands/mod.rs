//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod scan;

pub(crate) use build::BuildArgs;
pub(crate) use scan::ScanArgs;
