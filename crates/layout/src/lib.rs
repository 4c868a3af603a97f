//! Text measurement and line breaking for calibrated overlays.
//!
//! Overlay text is drawn with the non-embedded standard PDF fonts, so widths come
//! from the published AFM advance tables rather than from font files:
//! - [`StandardFont`] and the [`FontMetrics`] trait measure strings at a point size
//! - [`wrap`] breaks a string into physical lines that fit a fixed width

pub mod fonts;
pub mod wrap;

pub use fonts::{FontMetrics, StandardFont, UnknownFontError};
pub use wrap::{WrappedLines, wrap};
