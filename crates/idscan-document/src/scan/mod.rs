// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — binarization and optical character recognition (OCR).

pub mod binarize;
pub mod ocr;
pub mod tsv;

pub use binarize::Binarization;
pub use ocr::{OcrEngine, TesseractEngine};
