//! Image rendering for the terminal
//!
//! Supports multiple rendering modes:
//! - ASCII: placeholder boxes only
//! - Blocks: thumbnails drawn with half-block characters in true color
//! - Kitty: real images via the Kitty graphics protocol

pub mod kitty;
pub mod mode;
pub mod thumbnail;

pub use kitty::{ImagePlacement, KittyGraphics};
pub use mode::{detect_render_mode, RenderMode};
pub use thumbnail::{HalfBlockImage, ImageState, ImageStore};
