//! Drawing constants shared by the render pipeline and configuration defaults

/// Corner handle sizing
pub mod handle {
    /// Visual diameter of a corner handle in view pixels
    pub const SIZE: f32 = 40.0;
    /// Touch radius as a multiple of the handle size
    pub const TOUCH_FACTOR: f32 = 1.5;
    /// Bounding-box padding for region selection, as a multiple of the handle size
    pub const SELECT_PADDING_FACTOR: f32 = 2.0;

    /// Radius of the filled handle circle drawn for a given handle size
    #[inline]
    pub fn draw_radius(size: f32) -> f32 {
        size / 2.0
    }
}

/// Region outline and dim mask constants
pub mod outline {
    /// Stroke width for unselected regions
    pub const WIDTH: f32 = 4.0;
    /// Stroke width for the selected region
    pub const SELECTED_WIDTH: f32 = 5.0;
    /// Alpha of the mask drawn outside all regions (0x80)
    pub const DIM_ALPHA: u8 = 0x80;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_radius() {
        assert_eq!(handle::draw_radius(handle::SIZE), 20.0);
    }
}
