//! Working-space filter implementations.
//!
//! ## Supported Formats
//!
//! All filters take `(H, W, C)` f32 arrays holding linear light (0.0-1.0),
//! as produced by [`crate::convert::to_working`]:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale | (H, W, 1) | Single luminance channel |
//! | RGB | (H, W, 3) | Red, green, blue |
//! | RGBA | (H, W, 4) | RGB + straight alpha |
//!
//! ## Architecture
//!
//! - **Shape preserving** - Output always has the input's dimensions
//! - **Alpha preservation** - Alpha is untouched except by motion blur, which blurs it premultiplied
//! - **Grayscale handling** - Color-dependent filters (vibrance, sepia) are no-ops for grayscale
//! - **Row parallel** - Large images are split across rayon workers by row

pub mod core;
pub mod color_adjust;
pub mod color_science;
pub mod stylize;
pub mod blur;
