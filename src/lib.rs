//! Multi-region quadrilateral crop engine
//!
//! Hosts feed pointer events and view sizes into a [`CropEngine`], draw the
//! frames it renders and ask it for perspective-corrected crops of every
//! region. Auto-detected regions (for example from [`detect`]) can replace
//! the manual ones in one batch.

pub mod config;
pub mod detect;
pub mod domain;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gesture;
pub mod output;
pub mod render;
pub mod viewport;

pub use config::{CropConfig, CropStyle, RgbaColor};
pub use domain::{Corner, DragMode, HitResult, PixelRect, Point, Quad, RectF, RegionSet};
pub use engine::CropEngine;
pub use error::CropError;
pub use extract::{ExtractedCrop, ExtractionJob};
pub use gesture::{GestureOutcome, GestureState, TouchEvent, TouchPhase};
pub use viewport::Viewport;
