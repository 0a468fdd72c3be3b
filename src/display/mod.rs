//! Vector frame presentation.
//!
//! [`color`] holds the precomputed color-index → intensity table;
//! [`renderer`] rasterizes one tick's display list (plus the optional
//! audio debug overlay) into an RGB framebuffer the scheduler hands to
//! the window.

pub mod color;
pub mod renderer;

pub use color::ColorTable;
pub use renderer::VectorRenderer;
