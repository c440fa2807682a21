//! Perspective extraction of crop regions into rectangular images
//!
//! The engine snapshots everything extraction needs into an [`ExtractionJob`]
//! so the work can run on a blocking worker while the interactive loop keeps
//! handling touches.

pub mod homography;
pub mod warp;

use std::sync::Arc;

use image::RgbaImage;

use crate::domain::{Point, Quad};
use crate::error::{CropError, Result};
use crate::viewport::Viewport;
use homography::Homography;

/// One region's extraction inputs, already in source pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSnapshot {
    /// Index of the region in the collection
    pub region: usize,
    /// Corners in top-left, top-right, bottom-right, bottom-left order, clamped to the image
    pub corners: [Point; 4],
    pub width: u32,
    pub height: u32,
}

impl RegionSnapshot {
    /// Map a view-space region into the source image
    ///
    /// Output size is the region's bounding box in source pixels, floored at
    /// `min_output_size` on each axis.
    pub fn from_view(
        region: usize,
        quad: &Quad,
        viewport: &Viewport,
        min_output_size: u32,
    ) -> Option<Self> {
        let mut corners = [Point::default(); 4];
        for (dst, p) in corners.iter_mut().zip(quad.points()) {
            *dst = viewport.view_to_source_clamped(*p)?;
        }
        let bounds = quad.bounding_rect();
        let (w, h) = viewport.view_extent_to_source(bounds.width(), bounds.height())?;
        Some(Self {
            region,
            corners,
            width: (w.max(0.0) as u32).max(min_output_size),
            height: (h.max(0.0) as u32).max(min_output_size),
        })
    }

    /// Rectify this region out of `image`
    pub fn extract(&self, image: &RgbaImage) -> Result<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            return Err(CropError::InvalidOutputSize {
                width: self.width,
                height: self.height,
            });
        }
        let (w, h) = (self.width as f32, self.height as f32);
        let target = [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ];
        let transform = Homography::from_quad_to_quad(&self.corners, &target)
            .ok_or(CropError::DegenerateQuad { region: self.region })?;
        warp::warp_perspective(image, &transform, self.width, self.height)
    }
}

/// A rectified crop and the region it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCrop {
    pub region: usize,
    pub image: RgbaImage,
}

/// Owned snapshot of everything needed to extract all regions
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    image: Arc<RgbaImage>,
    regions: Vec<RegionSnapshot>,
}

impl ExtractionJob {
    pub fn new(image: Arc<RgbaImage>, regions: Vec<RegionSnapshot>) -> Self {
        Self { image, regions }
    }

    pub fn regions(&self) -> &[RegionSnapshot] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Extract every region in collection order, skipping failures
    pub fn run(&self) -> Vec<ExtractedCrop> {
        let crops: Vec<ExtractedCrop> = self
            .regions
            .iter()
            .filter_map(|snapshot| match snapshot.extract(&self.image) {
                Ok(image) => {
                    log::debug!(
                        "Extracted region {} ({}x{})",
                        snapshot.region,
                        snapshot.width,
                        snapshot.height
                    );
                    Some(ExtractedCrop {
                        region: snapshot.region,
                        image,
                    })
                }
                Err(err) => {
                    log::warn!("Skipping region {}: {}", snapshot.region, err);
                    None
                }
            })
            .collect();
        log::info!("Extracted {} of {} regions", crops.len(), self.regions.len());
        crops
    }

    /// Run on tokio's blocking pool so the caller's event loop stays responsive
    pub async fn run_blocking(self) -> anyhow::Result<Vec<ExtractedCrop>> {
        let crops = tokio::task::spawn_blocking(move || self.run()).await?;
        Ok(crops)
    }
}

/// Pick the crop for `selected`, else the first available
pub fn pick_selected(crops: Vec<ExtractedCrop>, selected: Option<usize>) -> Option<RgbaImage> {
    let index = selected
        .and_then(|s| crops.iter().position(|c| c.region == s))
        .unwrap_or(0);
    crops.into_iter().nth(index).map(|c| c.image)
}
