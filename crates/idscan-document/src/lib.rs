// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// idscan-document — Image handling for the student ID scanner.
//
// Provides the normalization pipeline that turns a phone photo into an
// OCR-friendly bitmap (upscale, grayscale, auto-contrast, sharpen, optional
// Otsu binarization) and the adapter around the Tesseract OCR engine.

pub mod image;
pub mod scan;

pub use crate::image::normalizer::ImageNormalizer;
pub use scan::binarize::Binarization;
pub use scan::ocr::{OcrEngine, TesseractEngine};
