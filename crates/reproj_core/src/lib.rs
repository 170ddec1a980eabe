//! Reproj Core - Backend logic for batch reprojection
//!
//! This crate contains the orchestration shell that walks a folder of
//! raster and vector datasets and reprojects each one through a
//! [`engine::GisEngine`]. It has no CLI dependencies and can be driven
//! by the `reproj` binary or embedded in another tool.

pub mod batch;
pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod naming;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
