//! Flat packed-pixel buffers and the byte layouts they are decoded from.
//!
//! A [`PixelBuffer`] is the only image representation the segmenters see:
//! `width * height` packed `0xAARRGGBB` words in row-major order plus a flag
//! saying whether alpha carries meaning.

use crate::color::{Argb, OPAQUE_ALPHA};
use crate::error::SegmentError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    has_alpha: bool,
}

impl PixelBuffer {
    /// Wrap an existing packed buffer, checking that it matches the dimensions.
    pub fn new(
        pixels: Vec<u32>,
        width: usize,
        height: usize,
        has_alpha: bool,
    ) -> Result<Self, SegmentError> {
        check_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            pixels,
            width,
            height,
            has_alpha,
        })
    }

    /// Decode interleaved bytes where each pixel is `[A,] B, G, R`.
    ///
    /// Without `has_alpha` every pixel is fully opaque.
    pub fn decode(
        data: &[u8],
        width: usize,
        height: usize,
        has_alpha: bool,
    ) -> Result<Self, SegmentError> {
        let stride = if has_alpha { 4 } else { 3 };
        check_byte_length(data.len(), width, height, stride)?;

        let pixels = data
            .chunks_exact(stride)
            .map(|px| {
                let (alpha, bgr) = if has_alpha {
                    ((px[0] as u32) << 24, &px[1..])
                } else {
                    (OPAQUE_ALPHA, px)
                };
                alpha | (bgr[0] as u32) | ((bgr[1] as u32) << 8) | ((bgr[2] as u32) << 16)
            })
            .collect();

        Ok(Self {
            pixels,
            width,
            height,
            has_alpha,
        })
    }

    /// Inverse of [`PixelBuffer::decode`].
    pub fn encode(&self) -> Vec<u8> {
        let stride = if self.has_alpha { 4 } else { 3 };
        let mut out = Vec::with_capacity(self.pixels.len() * stride);
        for &raw in &self.pixels {
            let p = Argb(raw);
            if self.has_alpha {
                out.push(p.alpha());
            }
            out.extend_from_slice(&[p.blue(), p.green(), p.red()]);
        }
        out
    }

    /// Decode `R, G, B, A` bytes, as handed over by a browser canvas.
    pub fn from_rgba_bytes(data: &[u8], width: usize, height: usize) -> Result<Self, SegmentError> {
        check_byte_length(data.len(), width, height, 4)?;
        let pixels = data
            .chunks_exact(4)
            .map(|px| Argb::from_rgba_array([px[0], px[1], px[2], px[3]]).0)
            .collect();
        Ok(Self {
            pixels,
            width,
            height,
            has_alpha: true,
        })
    }

    /// Convert to raw RGBA bytes. Alpha is forced opaque when it is not meaningful.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&raw| {
                let p = Argb(raw);
                let a = if self.has_alpha { p.alpha() } else { 0xFF };
                [p.red(), p.green(), p.blue(), a]
            })
            .collect()
    }

    /// Convert a decoded image, keeping alpha only if the source has it.
    #[cfg(feature = "native")]
    pub fn from_dynamic_image(img: &image::DynamicImage) -> Result<Self, SegmentError> {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let has_alpha = img.color().has_alpha();
        let pixels = if has_alpha {
            img.to_rgba8().pixels().map(|&p| Argb::from(p).0).collect()
        } else {
            img.to_rgb8().pixels().map(|&p| Argb::from(p).0).collect()
        };
        Self::new(pixels, width, height, has_alpha)
    }

    /// Build an `image` crate image: RGBA8 when alpha is meaningful, RGB8 otherwise.
    #[cfg(feature = "native")]
    pub fn to_dynamic_image(&self) -> image::DynamicImage {
        let (w, h) = (self.width as u32, self.height as u32);
        if self.has_alpha {
            let mut img = image::RgbaImage::new(w, h);
            for (i, &raw) in self.pixels.iter().enumerate() {
                let x = (i as u32) % w;
                let y = (i as u32) / w;
                img.put_pixel(x, y, Argb(raw).into());
            }
            image::DynamicImage::ImageRgba8(img)
        } else {
            let mut img = image::RgbImage::new(w, h);
            for (i, &raw) in self.pixels.iter().enumerate() {
                let x = (i as u32) % w;
                let y = (i as u32) / w;
                img.put_pixel(x, y, Argb(raw).into());
            }
            image::DynamicImage::ImageRgb8(img)
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Argb {
        Argb(self.pixels[y * self.width + x])
    }
}

/// Reject zero dimensions and buffers whose length is not `width * height`.
pub fn check_dimensions(len: usize, width: usize, height: usize) -> Result<(), SegmentError> {
    if width == 0 || height == 0 {
        return Err(SegmentError::ZeroDimension);
    }
    if width.checked_mul(height) != Some(len) {
        return Err(SegmentError::DimensionMismatch { len, width, height });
    }
    Ok(())
}

/// Like [`check_dimensions`] for interleaved bytes with `stride` bytes per pixel.
fn check_byte_length(
    len: usize,
    width: usize,
    height: usize,
    stride: usize,
) -> Result<(), SegmentError> {
    if width == 0 || height == 0 {
        return Err(SegmentError::ZeroDimension);
    }
    let expected = width.checked_mul(height).and_then(|n| n.checked_mul(stride));
    if expected != Some(len) {
        return Err(SegmentError::DimensionMismatch { len, width, height });
    }
    Ok(())
}
