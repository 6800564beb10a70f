// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normalizer — prepares a photographed ID card for OCR.
//
// Phone photos of ID cards are small, unevenly lit, and slightly blurred. The
// pipeline compensates for each in turn: upscale narrow images, collapse to
// grayscale, stretch the intensity range, sharpen, and finally binarize when a
// backend is compiled in.

use idscan_core::ScanConfig;
use idscan_core::error::{Result, ScanError};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use imageproc::filter::sharpen3x3;
use tracing::{debug, info, instrument};

use crate::scan::binarize::Binarization;

/// OCR preprocessing pipeline operating on a single in-memory image.
///
/// Each step consumes `self` and returns a new `ImageNormalizer`, so the steps
/// chain:
///
/// ```ignore
/// let gray = ImageNormalizer::from_bytes(&bytes)?
///     .upscale_if_small(900, 1200, 2.0)
///     .grayscale()
///     .auto_contrast()
///     .sharpen()
///     .binarize(Binarization::detect())
///     .into_gray();
/// ```
pub struct ImageNormalizer {
    image: DynamicImage,
}

impl ImageNormalizer {
    // -- Construction ---------------------------------------------------------

    /// Decode an image from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ScanError::ImageDecode("no image data supplied".into()));
        }
        let image = image::load_from_memory(data)
            .map_err(|err| ScanError::ImageDecode(err.to_string()))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Self::checked(image)
    }

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            ScanError::ImageDecode(format!("{}: {}", path.as_ref().display(), err))
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Self::checked(image)
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    fn checked(image: DynamicImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::ImageDecode("image has zero width or height".into()));
        }
        Ok(Self { image })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the normalizer and return a single-channel bitmap.
    pub fn into_gray(self) -> GrayImage {
        match self.image {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }
    }

    // -- Pipeline -------------------------------------------------------------

    /// Run every step with the thresholds from `config`.
    #[instrument(skip_all, fields(width = self.width(), height = self.height()))]
    pub fn normalize(self, config: &ScanConfig, binarization: Binarization) -> GrayImage {
        info!(binarize = binarization.is_available(), "Normalizing image for OCR");
        self.upscale_if_small(
            config.upscale_below_width,
            config.upscale_target_width,
            config.max_upscale,
        )
        .grayscale()
        .auto_contrast()
        .sharpen()
        .binarize(binarization)
        .into_gray()
    }

    // -- Steps (consume self, return new Self) ---------------------------------

    /// Upscale images narrower than `below_width` towards `target_width`,
    /// never by more than `max_scale`. Aspect ratio is preserved and Lanczos3
    /// is used for resampling.
    pub fn upscale_if_small(self, below_width: u32, target_width: u32, max_scale: f32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width >= below_width {
            return self;
        }

        let scale = (target_width as f32 / width.max(1) as f32).min(max_scale);
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);
        debug!(width, height, scale, new_width, new_height, "Upscaling small image");

        let resized = self
            .image
            .resize_exact(new_width, new_height, FilterType::Lanczos3);
        Self { image: resized }
    }

    pub fn grayscale(self) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Stretch the observed intensity range to the full 0–255 range.
    pub fn auto_contrast(self) -> Self {
        let gray = self.into_gray();
        Self {
            image: DynamicImage::ImageLuma8(stretch_contrast(gray)),
        }
    }

    pub fn sharpen(self) -> Self {
        let gray = self.into_gray();
        Self {
            image: DynamicImage::ImageLuma8(sharpen3x3(&gray)),
        }
    }

    pub fn binarize(self, binarization: Binarization) -> Self {
        let gray = self.into_gray();
        Self {
            image: DynamicImage::ImageLuma8(binarization.apply(gray)),
        }
    }
}

/// Linear min/max stretch. A flat image is returned as-is.
fn stretch_contrast(mut gray: GrayImage) -> GrayImage {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if max <= min {
        return gray;
    }

    let scale = 255.0 / (max - min) as f32;
    for pixel in gray.pixels_mut() {
        pixel.0[0] = ((pixel.0[0] - min) as f32 * scale).round() as u8;
    }
    gray
}
