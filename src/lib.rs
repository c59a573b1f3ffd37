//! Tilepal - tiled palette converter
//!
//! File formats, presets and errors around the `tile-quant` engine.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
