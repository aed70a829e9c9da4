//! Shared palette computation for sets of textures.
//!
//! Samples from every texture are counted into a weighted color histogram,
//! clustered with multi-attempt weighted k-means into at most 256 colors, and
//! the resulting palette is used to index each texture for the packed
//! `.txs` asset format.

pub mod color;
pub mod error;
pub mod histogram;
pub mod palette;
pub mod progress;
pub mod project;
pub mod quantize;
pub mod texture;
mod wasm;

pub use crate::color::{FloatColor, IntColor};
pub use crate::error::{Error, Result};
pub use crate::histogram::{Histogram, PointSet, WeightedPoint};
pub use crate::palette::{Palette, RESERVED_COLOR};
pub use crate::progress::{LogProgress, Progress, StepReport};
pub use crate::quantize::{
    Clamped, QuantizeOptions, Quantized, quantize, quantize_textures, quantize_with,
    quantize_with_rng,
};
pub use crate::wasm::calculate_palette;
