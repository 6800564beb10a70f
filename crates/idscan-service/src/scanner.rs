// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result assembly — the outermost boundary of a single scan.
//
// Every stage below this point is free to fail with `?` (or even panic).
// `Scanner` is the one place that turns those failures into an
// `ExtractionResult` with empty data fields and an error message, so callers
// always get a well-formed record back.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use idscan_core::error::{Result, ScanError};
use idscan_core::{ExtractionResult, ScanConfig};
use idscan_document::{Binarization, ImageNormalizer, OcrEngine, TesseractEngine};
use idscan_extract::{SurnameLocator, find_student_number};
use image::DynamicImage;
use tracing::{error, info, instrument, warn};

/// Runs the full extraction pipeline for one image at a time.
///
/// Holds no per-scan state, so one `Scanner` can serve concurrent requests.
pub struct Scanner {
    engine: Arc<dyn OcrEngine>,
    config: ScanConfig,
    binarization: Binarization,
    locator: SurnameLocator,
}

impl Scanner {
    /// Build a scanner around `engine` with the default heuristics.
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self::with_config(engine, ScanConfig::default())
    }

    pub fn with_config(engine: Arc<dyn OcrEngine>, config: ScanConfig) -> Self {
        Self {
            engine,
            locator: SurnameLocator::new(config.clone()),
            config,
            binarization: Binarization::detect(),
        }
    }

    /// Build a scanner backed by the installed Tesseract.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineUnavailable`] when Tesseract or its language
    /// pack is missing, and [`ScanError::Config`] for invalid settings.
    pub fn with_tesseract(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let engine = TesseractEngine::new(&config)?;
        Ok(Self::with_config(Arc::new(engine), config))
    }

    /// Override the binarization backend picked at construction.
    pub fn with_binarization(mut self, binarization: Binarization) -> Self {
        self.binarization = binarization;
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Engine release string, when the engine reports one.
    pub fn engine_version(&self) -> Option<&str> {
        self.engine.version()
    }

    // -- Entry points (never fail) --------------------------------------------

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn scan_path(&self, path: impl AsRef<Path>) -> ExtractionResult {
        self.guarded(|| self.run(ImageNormalizer::open(path.as_ref())?))
    }

    #[instrument(skip_all, fields(data_len = data.len()))]
    pub fn scan_bytes(&self, data: &[u8]) -> ExtractionResult {
        self.guarded(|| self.run(ImageNormalizer::from_bytes(data)?))
    }

    pub fn scan_image(&self, image: DynamicImage) -> ExtractionResult {
        self.guarded(|| self.run(ImageNormalizer::from_dynamic(image)))
    }

    // -- Pipeline -------------------------------------------------------------

    fn run(&self, normalizer: ImageNormalizer) -> Result<ExtractionResult> {
        let gray = normalizer.normalize(&self.config, self.binarization);

        let text = self.engine.recognize_text(&gray)?;
        let student_number = find_student_number(&text);
        let surname = self.locator.locate(self.engine.as_ref(), &gray, &text);

        info!(
            found_student_number = !student_number.is_empty(),
            found_surname = !surname.is_empty(),
            "Scan complete"
        );
        Ok(ExtractionResult::found(
            student_number.trim(),
            surname.trim(),
            text,
        ))
    }

    fn guarded(&self, scan: impl FnOnce() -> Result<ExtractionResult>) -> ExtractionResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(scan))
            .unwrap_or_else(|payload| Err(ScanError::Internal(panic_message(payload.as_ref()))));

        match outcome {
            Ok(result) => result,
            Err(err) => {
                match err.class() {
                    idscan_core::ErrorClass::Request => warn!(error = %err, "Scan rejected"),
                    _ => error!(error = %err, class = ?err.class(), "Scan failed"),
                }
                ExtractionResult::failed(err.to_string())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("scan panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("scan panicked: {msg}")
    } else {
        "scan panicked".to_string()
    }
}

/// Test doubles shared with the HTTP tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::io::Cursor;

    use idscan_core::error::{Result, ScanError};
    use idscan_core::{RecognizedWord, WordSet};
    use idscan_document::OcrEngine;
    use image::{GrayImage, ImageFormat, Luma};

    /// Replays canned OCR output regardless of the image.
    pub struct ScriptedEngine {
        pub text: std::result::Result<String, String>,
        pub words: std::result::Result<WordSet, String>,
        pub panic_on_text: bool,
        pub version: Option<String>,
    }

    impl ScriptedEngine {
        pub fn new(text: &str, words: Vec<RecognizedWord>) -> Self {
            Self {
                text: Ok(text.to_string()),
                words: Ok(WordSet::from(words)),
                panic_on_text: false,
                version: None,
            }
        }

        pub fn without_words(text: &str) -> Self {
            Self {
                text: Ok(text.to_string()),
                words: Err("word data unavailable".into()),
                panic_on_text: false,
                version: None,
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn version(&self) -> Option<&str> {
            self.version.as_deref()
        }

        fn recognize_text(&self, _image: &GrayImage) -> Result<String> {
            if self.panic_on_text {
                panic!("engine crashed");
            }
            self.text.clone().map_err(ScanError::OcrError)
        }

        fn recognize_words(&self, _image: &GrayImage) -> Result<WordSet> {
            self.words.clone().map_err(ScanError::OcrError)
        }
    }

    /// A small PNG with a dark stripe, encoded in memory.
    pub fn card_png() -> Vec<u8> {
        let mut img = GrayImage::from_pixel(120, 60, Luma([220]));
        for x in 10..110 {
            for y in 25..35 {
                img.put_pixel(x, y, Luma([30]));
            }
        }
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode test png");
        bytes
    }
}
