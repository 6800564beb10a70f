// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: every heuristic constant used by preprocessing, OCR,
// and field extraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Tunable parameters for preprocessing, OCR, and field extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Words below this OCR confidence are dropped before surname selection.
    pub min_confidence: f32,
    /// Lower bound of the vertical band tolerance, in pixels.
    pub band_tolerance_min_px: u32,
    /// Band tolerance as a fraction of image height; the larger of the two wins.
    pub band_tolerance_ratio: f32,
    /// Shortest surname candidate accepted near the ID band.
    pub min_name_len: usize,
    /// Longest surname candidate accepted near the ID band.
    pub max_name_len: usize,
    /// Images narrower than this are upscaled before OCR.
    pub upscale_below_width: u32,
    /// Width the upscale aims for.
    pub upscale_target_width: u32,
    /// Cap on the upscale factor.
    pub max_upscale: f32,
    /// Tesseract page segmentation mode for the word-level pass.
    pub page_segmentation_mode: u8,
    /// Tesseract language pack.
    pub ocr_language: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_confidence: 55.0,
            band_tolerance_min_px: 160,
            band_tolerance_ratio: 0.08,
            min_name_len: 3,
            max_name_len: 14,
            upscale_below_width: 900,
            upscale_target_width: 1200,
            max_upscale: 2.0,
            page_segmentation_mode: 6,
            ocr_language: "eng".into(),
        }
    }
}

impl ScanConfig {
    /// Load a config from a JSON file. Keys absent from the file keep their
    /// defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(ScanError::Config(format!(
                "min_confidence must be within 0..=100, got {}",
                self.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.band_tolerance_ratio) {
            return Err(ScanError::Config(format!(
                "band_tolerance_ratio must be within 0..=1, got {}",
                self.band_tolerance_ratio
            )));
        }
        if self.min_name_len == 0 || self.min_name_len > self.max_name_len {
            return Err(ScanError::Config(format!(
                "name length bounds are inverted or zero: {}..={}",
                self.min_name_len, self.max_name_len
            )));
        }
        if self.max_upscale < 1.0 {
            return Err(ScanError::Config(format!(
                "max_upscale must be at least 1.0, got {}",
                self.max_upscale
            )));
        }
        if self.page_segmentation_mode > 13 {
            return Err(ScanError::Config(format!(
                "page_segmentation_mode must be within 0..=13, got {}",
                self.page_segmentation_mode
            )));
        }
        if self.ocr_language.trim().is_empty() {
            return Err(ScanError::Config("ocr_language must not be empty".into()));
        }
        Ok(())
    }

    /// Vertical distance from the ID band within which a word still counts as
    /// "on the same line".
    pub fn band_tolerance(&self, image_height: u32) -> i32 {
        let scaled = (self.band_tolerance_ratio * image_height as f32) as i32;
        scaled.max(self.band_tolerance_min_px as i32)
    }
}
