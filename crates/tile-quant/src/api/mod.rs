//! Public API for the tile-quant crate.
//!
//! This module provides the [`TiledQuantizer`] pipeline, the [`Progress`]
//! callback seam and the crate's error types.

mod error;
mod progress;
mod quantizer;

pub use error::{ParseColorError, ParseOptionError, QuantizeError};
pub use progress::{NoProgress, Progress};
pub use quantizer::TiledQuantizer;
