//! Pixel-level content randomization
//!
//! Images are replaced by a grid of solid, randomly coloured square blocks of
//! the same size. Nothing of the original pixel data survives; only width,
//! height and the channel layout implied by the file format are kept.

use crate::domain::Result;
use image::{DynamicImage, ImageBuffer, ImageFormat, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Edge length of one colour block, in pixels
pub const DEFAULT_BLOCK_SIZE: u32 = 15;

/// Colour channels of a generated image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    /// Alpha is always opaque
    Rgba,
}

impl ChannelLayout {
    /// Layout written for a target file format
    ///
    /// PNG and GIF keep an alpha channel; BMP and JPEG are flat.
    pub fn for_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png | ImageFormat::Gif => ChannelLayout::Rgba,
            _ => ChannelLayout::Rgb,
        }
    }

    /// Layout matching an existing image
    pub fn of(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            ChannelLayout::Rgba
        } else {
            ChannelLayout::Rgb
        }
    }
}

pub struct ImageContentRandomizer {
    rng: StdRng,
    block_size: u32,
}

impl ImageContentRandomizer {
    /// A block size of zero is treated as one
    pub fn new(block_size: u32) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            block_size: block_size.max(1),
        }
    }

    pub fn with_seed(seed: u64, block_size: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// A `width` x `height` image of random solid blocks
    pub fn random_blocks(&mut self, width: u32, height: u32, layout: ChannelLayout) -> DynamicImage {
        match layout {
            ChannelLayout::Rgb => {
                let mut buffer = RgbImage::new(width, height);
                self.paint_blocks(&mut buffer, |rng| Rgb(rng.gen::<[u8; 3]>()));
                DynamicImage::ImageRgb8(buffer)
            }
            ChannelLayout::Rgba => {
                let mut buffer = RgbaImage::new(width, height);
                self.paint_blocks(&mut buffer, |rng| {
                    let [r, g, b] = rng.gen::<[u8; 3]>();
                    Rgba([r, g, b, u8::MAX])
                });
                DynamicImage::ImageRgba8(buffer)
            }
        }
    }

    /// Random replacement for `image` with the same dimensions and layout
    pub fn fill(&mut self, image: &DynamicImage) -> DynamicImage {
        self.random_blocks(image.width(), image.height(), ChannelLayout::of(image))
    }

    /// Decode the image at `path`, replace its content and re-encode it in the
    /// format implied by the extension
    pub fn randomize_file(&mut self, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)?;
        let source = image::open(path)?;
        let randomized = self.random_blocks(
            source.width(),
            source.height(),
            ChannelLayout::for_format(format),
        );
        randomized.save_with_format(path, format)?;
        Ok(())
    }

    // Blocks are walked column by column, clipped at the right and bottom edges.
    fn paint_blocks<P>(
        &mut self,
        buffer: &mut ImageBuffer<P, Vec<u8>>,
        mut color: impl FnMut(&mut StdRng) -> P,
    ) where
        P: Pixel<Subpixel = u8>,
    {
        let (width, height) = buffer.dimensions();
        let step = self.block_size as usize;
        for block_x in (0..width).step_by(step) {
            for block_y in (0..height).step_by(step) {
                let pixel = color(&mut self.rng);
                let x_end = block_x.saturating_add(self.block_size).min(width);
                let y_end = block_y.saturating_add(self.block_size).min(height);
                for x in block_x..x_end {
                    for y in block_y..y_end {
                        buffer.put_pixel(x, y, pixel);
                    }
                }
            }
        }
    }
}

impl Default for ImageContentRandomizer {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test]
    fn test_fill_preserves_dimensions() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(10, 20));
        let mut randomizer = ImageContentRandomizer::default();
        let filled = randomizer.fill(&source);
        assert_eq!(filled.width(), 10);
        assert_eq!(filled.height(), 20);
        assert_eq!(ChannelLayout::of(&filled), ChannelLayout::Rgb);
    }

    #[test]
    fn test_two_fills_differ() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(10, 20));
        let mut randomizer = ImageContentRandomizer::default();
        let first = randomizer.fill(&source);
        let second = randomizer.fill(&source);
        assert_ne!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_blocks_are_solid() {
        let mut randomizer = ImageContentRandomizer::with_seed(3, 4);
        let image = randomizer.random_blocks(8, 8, ChannelLayout::Rgb);
        let buffer = image.to_rgb8();
        assert_eq!(buffer.get_pixel(0, 0), buffer.get_pixel(3, 3));
        assert_eq!(buffer.get_pixel(4, 4), buffer.get_pixel(7, 7));
    }

    #[test]
    fn test_alpha_is_opaque() {
        let mut randomizer = ImageContentRandomizer::default();
        let image = randomizer.random_blocks(31, 17, ChannelLayout::Rgba);
        assert!(image.to_rgba8().pixels().all(|pixel| pixel[3] == u8::MAX));
    }

    #[test_case(ImageFormat::Png, ChannelLayout::Rgba; "png")]
    #[test_case(ImageFormat::Gif, ChannelLayout::Rgba; "gif")]
    #[test_case(ImageFormat::Bmp, ChannelLayout::Rgb; "bmp")]
    #[test_case(ImageFormat::Jpeg, ChannelLayout::Rgb; "jpeg")]
    fn test_layout_for_format(format: ImageFormat, expected: ChannelLayout) {
        assert_eq!(ChannelLayout::for_format(format), expected);
    }

    #[test]
    fn test_randomize_png_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("diagram.png");
        let original = RgbaImage::from_pixel(40, 25, Rgba([10, 20, 30, 255]));
        original.save(&path).unwrap();

        ImageContentRandomizer::default()
            .randomize_file(&path)
            .unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (40, 25));
        assert_ne!(reloaded.to_rgba8(), original);
    }

    #[test]
    fn test_undecodable_image_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(ImageContentRandomizer::default().randomize_file(&path).is_err());
    }
}
