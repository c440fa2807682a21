//! Saving extracted crops as PNG files

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use image::RgbaImage;

/// Encode an RGBA image as an 8-bit PNG
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

pub fn save_rgba(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(write_png(&mut file, img)?)
}

/// `Crop_<timestamp>_<n>.png`, numbered from 1
pub fn crop_file_name(time: &DateTime<Local>, n: usize) -> String {
    format!("{}_{}.png", time.format("Crop_%Y-%m-%d_%H-%M-%S"), n)
}

/// Default directory for saved crops
pub fn default_output_dir() -> Option<PathBuf> {
    dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
}

/// Write every crop into `dir`, returning the written paths in order
pub fn save_crops<'a>(
    dir: &Path,
    crops: impl IntoIterator<Item = &'a RgbaImage>,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
    let now = Local::now();
    crops
        .into_iter()
        .enumerate()
        .map(|(i, img)| {
            let path = dir.join(crop_file_name(&now, i + 1));
            save_rgba(img, &path)?;
            log::debug!("Saved {}", path.display());
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_crop_file_name() {
        let time = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(crop_file_name(&time, 2), "Crop_2024-03-05_07-08-09_2.png");
    }

    #[test]
    fn test_save_crops_writes_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("crops");
        let images = [RgbaImage::new(4, 3), RgbaImage::new(2, 2)];
        let paths = save_crops(&out, images.iter()).unwrap();
        assert_eq!(paths.len(), 2);

        let decoded = image::open(&paths[0]).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(paths[1].to_string_lossy().ends_with("_2.png"));
    }
}
