// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) adapter.
//
// The recognition engine is treated as a black box behind the `OcrEngine`
// trait. Each scan asks it twice: once for plain text in natural reading
// order, once for word-level rows carrying geometry and confidence.
//
// # Tesseract
//
// `TesseractEngine` drives the `tesseract` command-line program, which must be
// on `PATH` (or given explicitly). Availability is checked once, when the
// engine is constructed:
//
//   ```sh
//   apt install tesseract-ocr tesseract-ocr-eng
//   ```
//
// A missing binary or language pack surfaces as
// `ScanError::EngineUnavailable`, which callers treat as a deployment problem
// rather than a bad image.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use idscan_core::error::{Result, ScanError};
use idscan_core::{ScanConfig, WordSet};
use image::{GrayImage, ImageFormat};
use tracing::{debug, info, instrument, warn};

use crate::scan::tsv::parse_tsv;

const DEFAULT_BINARY: &str = "tesseract";

/// A text recognition backend.
///
/// Implementations must be usable from several request handlers at once.
pub trait OcrEngine: Send + Sync {
    /// Short identifier for logs and health reports.
    fn name(&self) -> &str;

    /// Engine release, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// All recognised text, lines separated by newlines.
    fn recognize_text(&self, image: &GrayImage) -> Result<String>;

    /// Word-level results in reading order, using a segmentation mode suited
    /// to sparse, structured text such as ID cards.
    fn recognize_words(&self, image: &GrayImage) -> Result<WordSet>;
}

/// OCR engine backed by the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    word_psm: u8,
    version: String,
}

impl TesseractEngine {
    /// Locate `tesseract` on `PATH` and confirm it can read `config.ocr_language`.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Self::with_binary(DEFAULT_BINARY, config)
    }

    /// Use a specific `tesseract` executable.
    #[instrument(skip(config), fields(binary = %binary.as_ref().display()))]
    pub fn with_binary(binary: impl AsRef<Path>, config: &ScanConfig) -> Result<Self> {
        let binary = binary.as_ref().to_path_buf();

        let output = Command::new(&binary).arg("--version").output().map_err(|err| {
            ScanError::EngineUnavailable(format!(
                "could not run {}: {} (is Tesseract installed?)",
                binary.display(),
                err
            ))
        })?;
        if !output.status.success() {
            return Err(ScanError::EngineUnavailable(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }
        // Older releases print the banner on stderr.
        let version = first_line(&output.stdout)
            .or_else(|| first_line(&output.stderr))
            .unwrap_or_else(|| "tesseract (unknown version)".into());

        let languages = list_languages(&binary)?;
        if !languages.iter().any(|lang| lang == &config.ocr_language) {
            return Err(ScanError::EngineUnavailable(format!(
                "language pack '{}' not installed (available: {})",
                config.ocr_language,
                languages.join(", ")
            )));
        }

        info!(%version, language = %config.ocr_language, "Tesseract engine ready");
        Ok(Self {
            binary,
            language: config.ocr_language.clone(),
            word_psm: config.page_segmentation_mode,
            version,
        })
    }

    /// Write `image` to a temporary PNG and run Tesseract over it.
    fn run(&self, image: &GrayImage, psm: Option<u8>, output_config: Option<&str>) -> Result<String> {
        let mut tmp = tempfile::Builder::new()
            .prefix("idscan-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(tmp.as_file_mut(), ImageFormat::Png)
            .map_err(|err| ScanError::ImageError(format!("failed to encode OCR input: {}", err)))?;

        let mut command = Command::new(&self.binary);
        command.arg(tmp.path()).arg("stdout").arg("-l").arg(&self.language);
        if let Some(psm) = psm {
            command.arg("--psm").arg(psm.to_string());
        }
        if let Some(output_config) = output_config {
            command.arg(output_config);
        }

        let output = command
            .output()
            .map_err(|err| ScanError::OcrError(format!("failed to run tesseract: {}", err)))?;
        check_status(&output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize_text(&self, image: &GrayImage) -> Result<String> {
        info!("Starting OCR text recognition");
        let text = self.run(image, None, None)?;
        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR text recognition complete"
        );
        Ok(text)
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height(), psm = self.word_psm))]
    fn recognize_words(&self, image: &GrayImage) -> Result<WordSet> {
        info!("Starting word-level OCR");
        let tsv = self.run(image, Some(self.word_psm), Some("tsv"))?;
        let words = parse_tsv(&tsv);
        if words.is_empty() {
            warn!("Word-level OCR returned no words");
        }
        Ok(words)
    }
}

fn check_status(output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ScanError::OcrError(format!(
        "tesseract exited with {}: {}",
        output.status,
        stderr.trim()
    )))
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Languages the installed Tesseract can recognise.
fn list_languages(binary: &Path) -> Result<Vec<String>> {
    let output = Command::new(binary)
        .arg("--list-langs")
        .output()
        .map_err(|err| ScanError::EngineUnavailable(format!("failed to list languages: {}", err)))?;
    if !output.status.success() {
        return Err(ScanError::EngineUnavailable(format!(
            "{} --list-langs exited with {}",
            binary.display(),
            output.status
        )));
    }

    let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
    listing.push('\n');
    listing.push_str(&String::from_utf8_lossy(&output.stderr));

    // The first line is a banner ("List of available languages in ...").
    Ok(listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of"))
        .map(str::to_string)
        .collect())
}
