//! Tile preview rendering.
//!
//! Crops `(grid_x, grid_y, grid_x + tile, grid_y + tile)` out of the source
//! image and scales it to a square preview. Parts of the crop outside the
//! image stay black.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use std::path::Path;

use crate::error::ReviewError;

/// Fill color of the placeholder shown when an image can't be loaded.
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([64, 64, 64, 255]);

/// Cross color of the placeholder.
const PLACEHOLDER_MARK: Rgba<u8> = Rgba([200, 40, 40, 255]);

/// Decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage, ReviewError> {
    image::open(path).map_err(|e| ReviewError::ImageLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Cut a `tile`-sized square with top-left `(x, y)` out of `image`.
pub fn crop_tile(image: &DynamicImage, x: u32, y: u32, tile: u32) -> RgbaImage {
    let rgba = image.to_rgba8();
    let mut out = RgbaImage::from_pixel(tile, tile, Rgba([0, 0, 0, 255]));

    if x < rgba.width() && y < rgba.height() {
        let view = imageops::crop_imm(&rgba, x, y, tile, tile).to_image();
        imageops::replace(&mut out, &view, 0, 0);
    }

    out
}

/// Load an image and render the tile at `(x, y)` as a `size` x `size` preview.
pub fn render_tile(
    path: &Path,
    x: u32,
    y: u32,
    tile: u32,
    size: u32,
) -> Result<RgbaImage, ReviewError> {
    let image = load_image(path)?;
    let crop = crop_tile(&image, x, y, tile);
    log::trace!(
        "Rendered tile ({}, {}) of {:?} at {}px",
        x,
        y,
        path,
        size
    );
    Ok(imageops::resize(
        &crop,
        size,
        size,
        imageops::FilterType::CatmullRom,
    ))
}

/// Gray square with a red cross, shown in place of a tile that can't be loaded.
pub fn placeholder(size: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, PLACEHOLDER_FILL);
    for i in 0..size {
        image.put_pixel(i, i, PLACEHOLDER_MARK);
        image.put_pixel(size - 1 - i, i, PLACEHOLDER_MARK);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        }))
    }

    #[test]
    fn test_crop_inside_image() {
        let image = gradient(600, 400);
        let tile = crop_tile(&image, 200, 200, 200);
        assert_eq!(tile.dimensions(), (200, 200));
        assert_eq!(tile.get_pixel(0, 0), &Rgba([200, 200, 0, 255]));
    }

    #[test]
    fn test_crop_past_edge_is_padded() {
        let image = gradient(300, 300);
        let tile = crop_tile(&image, 200, 200, 200);
        assert_eq!(tile.dimensions(), (200, 200));
        assert_eq!(tile.get_pixel(50, 50), &Rgba([250, 250, 0, 255]));
        assert_eq!(tile.get_pixel(150, 150), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_crop_outside_image_is_black() {
        let tile = crop_tile(&gradient(100, 100), 400, 0, 200);
        assert!(tile.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_render_tile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img1.png");
        gradient(400, 400).save(&path).unwrap();

        let preview = render_tile(&path, 0, 200, 200, 400).unwrap();
        assert_eq!(preview.dimensions(), (400, 400));
    }

    #[test]
    fn test_missing_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_tile(&dir.path().join("absent.jpg"), 0, 0, 200, 400).unwrap_err();
        assert!(matches!(err, ReviewError::ImageLoad { .. }));
    }

    #[test]
    fn test_placeholder() {
        let image = placeholder(8);
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(0, 0), &PLACEHOLDER_MARK);
        assert_eq!(image.get_pixel(7, 0), &PLACEHOLDER_MARK);
        assert_eq!(image.get_pixel(3, 0), &PLACEHOLDER_FILL);
    }
}
