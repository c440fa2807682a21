//! Crop engine: the host-facing façade
//!
//! Owns the region collection, gesture state, viewport and crop mode, and
//! borrows the source image weakly. Every entry point is fail-soft: misuse or
//! a disposed image is logged and turned into a no-op.

use std::cell::OnceCell;
use std::sync::{Arc, Weak};

use image::RgbaImage;
use tiny_skia::Pixmap;

use crate::config::CropConfig;
use crate::domain::{PixelRect, Point, Quad, RectF, RegionSet};
use crate::error::CropError;
use crate::extract::{self, ExtractedCrop, ExtractionJob, RegionSnapshot};
use crate::gesture::{GestureState, TouchEvent};
use crate::render;
use crate::viewport::Viewport;

#[derive(Debug, Default)]
pub struct CropEngine {
    config: CropConfig,
    image: Option<Weak<RgbaImage>>,
    /// Premultiplied copy of the image for drawing, built on first render
    source_pixmap: OnceCell<Pixmap>,
    viewport: Viewport,
    regions: RegionSet,
    gesture: GestureState,
    crop_mode: bool,
    /// Auto-detected regions received before layout was ready
    pending_auto: Option<Vec<PixelRect>>,
}

impl CropEngine {
    pub fn new(config: CropConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Set the source image, discarding all regions
    ///
    /// Only a weak reference is kept: the caller owns the pixels.
    pub fn set_image(&mut self, image: &Arc<RgbaImage>) {
        self.image = Some(Arc::downgrade(image));
        self.source_pixmap = OnceCell::new();
        self.viewport = Viewport::new(
            self.viewport.view_width,
            self.viewport.view_height,
            image.width(),
            image.height(),
        );
        self.reset_regions();
        log::debug!(
            "Image set: {}x{}, fit {:?}",
            image.width(),
            image.height(),
            self.viewport.fit()
        );
    }

    /// Drop the image and all regions
    pub fn clear_image(&mut self) {
        self.image = None;
        self.source_pixmap = OnceCell::new();
        self.viewport = Viewport::new(self.viewport.view_width, self.viewport.view_height, 0, 0);
        self.reset_regions();
    }

    fn reset_regions(&mut self) {
        self.regions.clear();
        self.regions.mark_dirty();
        self.gesture = GestureState::Idle;
        self.pending_auto = None;
    }

    /// True only while the image behind the weak reference is still alive
    fn has_image(&self) -> bool {
        self.image().is_ok()
    }

    /// Upgrade the weak image reference
    fn image(&self) -> Result<Arc<RgbaImage>, CropError> {
        let weak = self.image.as_ref().ok_or(CropError::NoImage)?;
        weak.upgrade().ok_or(CropError::ImageDisposed)
    }

    /// Recompute the fit rectangle for a new view size
    ///
    /// Existing regions are remapped proportionally onto the new fit
    /// rectangle. A buffered auto-detection batch is applied once layout is
    /// ready.
    pub fn on_viewport_resized(&mut self, width: f32, height: f32) {
        let old = self.viewport;
        let new = Viewport::new(width, height, old.image_width, old.image_height);
        self.viewport = new;

        if old.is_ready() && new.is_ready() && !self.regions.is_empty() {
            let fit = new.fit();
            self.regions.for_each_mut(|quad| {
                let mut mapped = quad.map(|p| old.remap_point(p, &new));
                mapped.clamp_to(&fit);
                *quad = mapped;
            });
        }
        self.gesture = GestureState::Idle;
        self.regions.mark_dirty();

        if new.is_ready()
            && let Some(pending) = self.pending_auto.take()
        {
            log::debug!("Layout ready, applying {} buffered regions", pending.len());
            self.apply_auto_regions(&pending);
        }
    }

    /// Replace all regions with an auto-detected batch (source pixels)
    ///
    /// Ignored without an image or with an empty batch. Buffered until the
    /// layout is ready.
    pub fn set_auto_regions(&mut self, rects: &[PixelRect]) {
        if !self.has_image() || rects.is_empty() {
            log::debug!("Ignoring auto regions: no image or empty batch");
            return;
        }
        if !self.viewport.is_ready() {
            log::debug!("Layout not ready, buffering {} regions", rects.len());
            self.pending_auto = Some(rects.to_vec());
            return;
        }
        self.apply_auto_regions(rects);
    }

    fn apply_auto_regions(&mut self, rects: &[PixelRect]) {
        let fit = self.viewport.fit();
        let min_size = self.config.min_detected_size;
        let quads: Vec<Quad> = rects
            .iter()
            .filter_map(|&rect| self.viewport.source_to_view(rect))
            .filter(|view| {
                if view.top < fit.top {
                    log::warn!("Dropping region above the image: {:?}", view);
                    return false;
                }
                true
            })
            .map(|view| {
                let mut quad = Quad::from_rect(view);
                quad.clamp_to(&fit);
                quad
            })
            .filter(|quad| {
                // Judged on the clamped bounds
                let clamped = quad.bounding_rect();
                if clamped.width() <= min_size || clamped.height() <= min_size {
                    log::warn!("Dropping undersized region: {:?}", clamped);
                    return false;
                }
                true
            })
            .collect();

        log::info!("Applied {} of {} auto regions", quads.len(), rects.len());
        self.gesture = GestureState::Idle;
        self.regions.replace_all(quads);
    }

    /// Add a region at 60% of the fit size, cascaded past existing ones
    pub fn add_region(&mut self) -> bool {
        if !self.has_image() || !self.viewport.is_ready() {
            log::debug!("Cannot add region: {}", CropError::LayoutNotReady);
            return false;
        }
        let fit = self.viewport.fit();
        let c = &self.config;
        let width = fit.width() * c.add_size_fraction;
        let height = fit.height() * c.add_size_fraction;
        let offset = self.regions.len() as f32 * c.add_cascade_offset;
        let left = (fit.left + fit.width() * c.add_margin + offset)
            .min(fit.right - width)
            .max(fit.left);
        let top = (fit.top + fit.height() * c.add_margin + offset)
            .min(fit.bottom - height)
            .max(fit.top);

        let mut quad = Quad::from_rect(RectF::new(left, top, left + width, top + height));
        quad.clamp_to(&fit);
        let index = self.regions.push(quad, true);
        log::debug!("Added region {}, {} total", index, self.regions.len());
        true
    }

    /// Add a region inset from the fit rectangle by `margin` on each side
    pub fn add_default_region(&mut self, margin: f32) -> bool {
        if !self.has_image() || !self.viewport.is_ready() {
            return false;
        }
        self.regions.push(Quad::inset(self.viewport.fit(), margin), true);
        true
    }

    /// Remove the selected region; false when nothing is selected
    pub fn remove_selected(&mut self) -> bool {
        self.gesture = GestureState::Idle;
        let removed = self.regions.remove_selected().is_some();
        if removed {
            log::debug!("Removed region, {} left", self.regions.len());
        }
        removed
    }

    pub fn set_crop_mode(&mut self, enabled: bool) {
        if self.crop_mode != enabled {
            self.crop_mode = enabled;
            self.gesture = GestureState::Idle;
            self.regions.mark_dirty();
        }
    }

    /// Enter crop mode, adding a region if there is none yet
    pub fn enter_crop_mode(&mut self) {
        self.set_crop_mode(true);
        if self.regions.is_empty() && self.has_image() && self.viewport.is_ready() {
            self.add_region();
        }
    }

    pub fn exit_crop_mode(&mut self) {
        self.set_crop_mode(false);
    }

    pub fn is_crop_mode(&self) -> bool {
        self.crop_mode
    }

    /// Handle a pointer event; returns whether it was consumed
    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        if !self.crop_mode || !self.viewport.is_ready() {
            return false;
        }
        let fit = self.viewport.fit();
        self.gesture
            .handle(event, &mut self.regions, &fit, &self.config)
            .consumed
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn has_selection(&self) -> bool {
        self.regions.selected().is_some()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.regions.selected()
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.regions.select(index);
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn fit_rect(&self) -> RectF {
        self.viewport.fit()
    }

    /// Bounding box of the selected region in source pixels, clamped to the image
    pub fn selected_source_bounds(&self) -> Option<PixelRect> {
        let quad = self.regions.selected_quad()?;
        self.viewport.view_rect_to_source(quad.bounding_rect())
    }

    /// Convert a view point into source pixels
    pub fn view_to_source(&self, point: Point) -> Option<Point> {
        self.viewport.view_to_source(point)
    }

    pub fn is_dirty(&self) -> bool {
        self.regions.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.regions.clear_dirty();
    }

    /// Render the current view
    pub fn render(&self) -> Option<Pixmap> {
        let image = match self.image() {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Nothing to render: {}", err);
                return None;
            }
        };
        if self.source_pixmap.get().is_none() {
            let pixmap = render::rgba_to_pixmap(&image)?;
            log::debug!("Cached source pixmap {}x{}", pixmap.width(), pixmap.height());
            let _ = self.source_pixmap.set(pixmap);
        }
        render::render_view(
            self.source_pixmap.get()?,
            &self.viewport,
            &self.regions,
            self.crop_mode,
            &self.config,
        )
    }

    /// Snapshot everything extraction needs, for running off the interactive loop
    pub fn extraction_job(&self) -> Option<ExtractionJob> {
        let image = match self.image() {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Cannot extract: {}", err);
                return None;
            }
        };
        if !self.viewport.is_ready() {
            log::warn!("Cannot extract: {}", CropError::LayoutNotReady);
            return None;
        }
        let snapshots = self
            .regions
            .regions()
            .iter()
            .enumerate()
            .filter_map(|(i, quad)| {
                RegionSnapshot::from_view(i, quad, &self.viewport, self.config.min_output_size)
            })
            .collect();
        Some(ExtractionJob::new(image, snapshots))
    }

    /// Extract every region, in collection order, skipping failures
    pub fn extract_all(&self) -> Vec<ExtractedCrop> {
        self.extraction_job()
            .map(|job| job.run())
            .unwrap_or_default()
    }

    /// The selected region's crop, or the first available one
    pub fn extract_selected(&self) -> Option<RgbaImage> {
        extract::pick_selected(self.extract_all(), self.regions.selected())
    }
}
