//! Pure domain types with minimal dependencies
//!
//! Geometry, crop regions and the region collection. Nothing here knows
//! about rendering, images or the host UI.

pub mod geometry;
pub mod region;
pub mod selection;

pub use geometry::*;
pub use region::*;
pub use selection::*;
