//! Packed ARGB pixel values and the color metrics used by the segmenters.
//!
//! Pixels travel through the crate as `0xAARRGGBB` words. [`Argb`] is a thin
//! view over one such word that knows how to pull channels out of it and
//! compare it against another pixel.

/// Fully opaque alpha channel, already shifted into place.
pub const OPAQUE_ALPHA: u32 = 0xFF00_0000;

/// Scale applied to a luma difference before truncating to an integer weight.
pub const LUMA_WEIGHT_SCALE: f64 = 1000.0;

/// One packed `0xAARRGGBB` pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Argb(pub u32);

impl Argb {
    #[inline(always)]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Opaque pixel from red, green and blue.
    #[inline(always)]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(0xFF, r, g, b)
    }

    #[inline(always)]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline(always)]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline(always)]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline(always)]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    pub fn from_rgba_array(arr: [u8; 4]) -> Self {
        Self::new(arr[3], arr[0], arr[1], arr[2])
    }

    /// Sum of squared differences over red, green and blue. Alpha is ignored.
    #[inline(always)]
    pub fn distance_squared(self, other: Self) -> u32 {
        let dr = self.red() as i32 - other.red() as i32;
        let dg = self.green() as i32 - other.green() as i32;
        let db = self.blue() as i32 - other.blue() as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Perceptual luma in `[0, 1]` from normalized channels.
    #[inline(always)]
    pub fn luma(self) -> f64 {
        let r = (self.red() as f64 / 255.0).min(1.0);
        let g = (self.green() as f64 / 255.0).min(1.0);
        let b = (self.blue() as f64 / 255.0).min(1.0);
        (0.2126 * r + 0.7152 * g + 0.0722 * b).min(1.0)
    }

    /// Integer edge weight between two pixels: the luma difference scaled by
    /// [`LUMA_WEIGHT_SCALE`] and truncated.
    #[inline]
    pub fn luma_weight(self, other: Self) -> u32 {
        luma_difference_weight(self.luma(), other.luma())
    }
}

/// Scaled, truncated absolute difference of two luma values.
#[inline(always)]
pub fn luma_difference_weight(a: f64, b: f64) -> u32 {
    ((a - b).abs() * LUMA_WEIGHT_SCALE) as u32
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Argb> for u32 {
    fn from(value: Argb) -> Self {
        value.0
    }
}

#[cfg(feature = "native")]
impl From<image::Rgba<u8>> for Argb {
    fn from(p: image::Rgba<u8>) -> Self {
        Self::from_rgba_array(p.0)
    }
}

#[cfg(feature = "native")]
impl From<image::Rgb<u8>> for Argb {
    fn from(p: image::Rgb<u8>) -> Self {
        Self::rgb(p[0], p[1], p[2])
    }
}

#[cfg(feature = "native")]
impl From<Argb> for image::Rgba<u8> {
    fn from(p: Argb) -> Self {
        image::Rgba(p.to_rgba_array())
    }
}

#[cfg(feature = "native")]
impl From<Argb> for image::Rgb<u8> {
    fn from(p: Argb) -> Self {
        image::Rgb([p.red(), p.green(), p.blue()])
    }
}
