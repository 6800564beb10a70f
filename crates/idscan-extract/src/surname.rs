// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Surname location.
//
// The card prints the surname in a larger font than the surrounding
// boilerplate, somewhere near the line that carries the student number. The
// locator leans on that layout, then falls back to weaker signals:
//
// 1. Band: confident, name-shaped words near the ID line; tallest wins.
// 2. Anywhere: the same without the vertical constraint (and without the
//    length and case rules); tallest wins.
// 3. Plain text: no geometry at all; the longest alphabetic run wins.
//
// Each stage is a plain function over its inputs and only runs when the
// previous one came back empty.

use std::sync::LazyLock;

use idscan_core::{RecognizedWord, ScanConfig, WordSet};
use idscan_document::OcrEngine;
use image::GrayImage;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::blacklist::is_blacklisted;

static ALPHA_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{3,}").expect("valid regex"));

/// Characters that separate the groups of a student number.
const ID_SEPARATORS: [char; 4] = ['-', '–', '—', '/'];

/// Which fallback stage produced the surname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurnameStage {
    Band,
    Anywhere,
    PlainText,
}

/// A located surname, already title-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurnameMatch {
    pub surname: String,
    pub stage: SurnameStage,
}

/// Picks the most likely surname out of OCR output.
#[derive(Debug, Clone)]
pub struct SurnameLocator {
    config: ScanConfig,
}

impl SurnameLocator {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Query `engine` for word geometry on `image` and locate the surname,
    /// falling back to `plain_text` when the engine fails or finds nothing
    /// usable. Returns an empty string on a miss.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, engine: &dyn OcrEngine, image: &GrayImage, plain_text: &str) -> String {
        let words = match engine.recognize_words(image) {
            Ok(words) => Some(words),
            Err(err) => {
                warn!(error = %err, "Word-level OCR failed; using plain text only");
                None
            }
        };

        self.locate_in(words.as_ref(), image.height(), plain_text)
            .map(|found| found.surname)
            .unwrap_or_default()
    }

    /// Run the stages over already-recognised words.
    pub fn locate_in(
        &self,
        words: Option<&WordSet>,
        image_height: u32,
        plain_text: &str,
    ) -> Option<SurnameMatch> {
        let reliable = words
            .map(|words| self.reliable_words(words))
            .unwrap_or_default();
        debug!(reliable = reliable.len(), "Confident words kept");

        let found = self
            .select_in_band(&reliable, image_height)
            .map(|word| (word, SurnameStage::Band))
            .or_else(|| select_anywhere(&reliable).map(|word| (word, SurnameStage::Anywhere)))
            .or_else(|| select_from_text(plain_text).map(|word| (word, SurnameStage::PlainText)));

        match found {
            Some((word, stage)) => {
                let surname = title_case(word);
                info!(?stage, %surname, "Surname located");
                Some(SurnameMatch { surname, stage })
            }
            None => {
                info!("No surname candidate survived any stage");
                None
            }
        }
    }

    /// Drop empty and low-confidence words.
    fn reliable_words<'a>(&self, words: &'a WordSet) -> Vec<&'a RecognizedWord> {
        words
            .iter()
            .filter(|w| !w.text.trim().is_empty())
            .filter(|w| w.confidence >= self.config.min_confidence)
            .collect()
    }

    /// Tallest name-shaped word within the band tolerance of the ID line.
    pub fn select_in_band<'a>(
        &self,
        words: &[&'a RecognizedWord],
        image_height: u32,
    ) -> Option<&'a str> {
        if words.is_empty() {
            return None;
        }
        let band = estimate_id_band(words);
        let tolerance = self.config.band_tolerance(image_height) as f64;
        debug!(band, tolerance, "ID band estimated");

        tallest(words.iter().copied().filter(|w| {
            self.is_name_shaped(&w.text) && (w.top as f64 - band).abs() <= tolerance
        }))
    }

    /// Alphabetic, correctly sized, upper- or capitalised, and not blacklisted.
    fn is_name_shaped(&self, text: &str) -> bool {
        let len = text.chars().count();
        is_alphabetic(text)
            && (self.config.min_name_len..=self.config.max_name_len).contains(&len)
            && (is_all_upper(text) || (len >= 3 && starts_upper(text)))
            && !is_blacklisted(text)
    }
}

/// Median `top` of the words that look like student number fragments, or of
/// all words when none do.
pub fn estimate_id_band(words: &[&RecognizedWord]) -> f64 {
    let fragment_tops: Vec<i32> = words
        .iter()
        .filter(|w| looks_like_id_fragment(&w.text))
        .map(|w| w.top)
        .collect();
    if !fragment_tops.is_empty() {
        return median(&fragment_tops);
    }
    let all_tops: Vec<i32> = words.iter().map(|w| w.top).collect();
    median(&all_tops)
}

fn looks_like_id_fragment(text: &str) -> bool {
    text.contains(ID_SEPARATORS)
        && (text.contains("MN") || text.chars().any(|c| c.is_ascii_digit()))
}

/// Tallest alphabetic, non-blacklisted word anywhere on the card.
pub fn select_anywhere<'a>(words: &[&'a RecognizedWord]) -> Option<&'a str> {
    tallest(
        words
            .iter()
            .copied()
            .filter(|w| is_alphabetic(&w.text) && !is_blacklisted(&w.text)),
    )
}

/// Longest alphabetic run (three letters or more) in the plain text that is
/// not blacklisted.
pub fn select_from_text(text: &str) -> Option<&str> {
    ALPHA_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !is_blacklisted(token))
        .reduce(|best, token| if token.len() > best.len() { token } else { best })
}

/// First character upper-case, the rest lower-case.
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Median of `values`; the mean of the middle pair for even counts, 0 when
/// empty.
pub fn median(values: &[i32]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2] as f64,
        _ => (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0,
    }
}

/// Tallest word; ties go to the earliest in reading order.
fn tallest<'a>(words: impl Iterator<Item = &'a RecognizedWord>) -> Option<&'a str> {
    words
        .reduce(|best, w| if w.height > best.height { w } else { best })
        .map(|w| w.text.as_str())
}

fn is_alphabetic(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_all_upper(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_uppercase())
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
