//! View rendering module
//!
//! This module contains:
//! - Drawing constants shared with the configuration defaults
//! - The tiny-skia pipeline that composes image, dim mask, outlines and handles

pub mod geometry;
pub mod image;

pub use self::image::{pixmap_to_rgba, render_view, rgba_to_pixmap};
