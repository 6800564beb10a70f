// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global Otsu binarization, compiled in with the `binarize` feature.
//
// The normalizer asks `Binarization::detect()` once and skips the step when
// the backend is absent, so builds without the feature still produce a usable
// (grayscale) OCR input.

use image::GrayImage;
#[cfg(feature = "binarize")]
use imageproc::contrast::{ThresholdType, otsu_level, threshold_mut};
use tracing::debug;
#[cfg(feature = "binarize")]
use tracing::info;

/// Which binarization backend this build can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binarization {
    /// Single global threshold chosen by Otsu's method.
    #[cfg(feature = "binarize")]
    Otsu,
    /// No backend compiled in; images pass through untouched.
    Unavailable,
}

impl Binarization {
    /// Report the backend compiled into this build.
    pub fn detect() -> Self {
        #[cfg(feature = "binarize")]
        {
            Self::Otsu
        }
        #[cfg(not(feature = "binarize"))]
        {
            Self::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// Binarize `gray`, or return it unchanged when no backend is available.
    pub fn apply(&self, gray: GrayImage) -> GrayImage {
        match self {
            #[cfg(feature = "binarize")]
            Self::Otsu => {
                info!("Applying Otsu binarization");
                let level = otsu_threshold(&gray);
                debug!(level, "Otsu threshold computed");
                // Binary: above the level becomes white, the rest black.
                let mut binary = gray;
                threshold_mut(&mut binary, level, ThresholdType::Binary);
                binary
            }
            Self::Unavailable => {
                debug!("No binarization backend; passing grayscale through");
                gray
            }
        }
    }
}

/// Otsu threshold for `gray`: pixels at or below it form the dark class.
#[cfg(feature = "binarize")]
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    otsu_level(gray)
}


#[cfg(test)]
mod passthrough_tests {
    use image::Luma;

    use super::*;

    #[test]
    fn unavailable_backend_passes_image_through() {
        let mut img = GrayImage::from_pixel(8, 8, Luma([120]));
        img.put_pixel(2, 2, Luma([33]));
        let out = Binarization::Unavailable.apply(img.clone());
        assert_eq!(out, img);
        assert!(!Binarization::Unavailable.is_available());
    }
}
