// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the scanner.

use serde::{Deserialize, Serialize};

/// Position of a word in the OCR engine's layout tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl LineKey {
    pub fn new(block: u32, paragraph: u32, line: u32) -> Self {
        Self {
            block,
            paragraph,
            line,
        }
    }
}

/// A single word reported by the OCR engine, with its vertical geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    /// Recognised text, already trimmed.
    pub text: String,
    /// Pixel offset of the word's top edge.
    pub top: i32,
    /// Pixel height of the word's bounding box.
    pub height: i32,
    /// Recognition confidence in 0–100, or -1 when the engine gave none.
    pub confidence: f32,
    pub line_key: LineKey,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, top: i32, height: i32, confidence: f32) -> Self {
        Self {
            text: text.into(),
            top,
            height,
            confidence,
            line_key: LineKey::default(),
        }
    }

    pub fn with_line_key(mut self, line_key: LineKey) -> Self {
        self.line_key = line_key;
        self
    }
}

/// All words found in one image, in the engine's reading order.
///
/// May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordSet(Vec<RecognizedWord>);

impl WordSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, word: RecognizedWord) {
        self.0.push(word);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecognizedWord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[RecognizedWord] {
        &self.0
    }
}

impl From<Vec<RecognizedWord>> for WordSet {
    fn from(words: Vec<RecognizedWord>) -> Self {
        Self(words)
    }
}

impl FromIterator<RecognizedWord> for WordSet {
    fn from_iter<I: IntoIterator<Item = RecognizedWord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a WordSet {
    type Item = &'a RecognizedWord;
    type IntoIter = std::slice::Iter<'a, RecognizedWord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The outcome of one scan.
///
/// Every string field is always present. Empty strings mean "not found";
/// `error` is only set when the scan itself failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub student_number: String,
    pub surname: String,
    /// Full plain text recognised in the image.
    pub raw_text: String,
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn found(
        student_number: impl Into<String>,
        surname: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            student_number: student_number.into(),
            surname: surname.into(),
            raw_text: raw_text.into(),
            error: None,
        }
    }

    /// A result carrying only an error message; data fields stay empty.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
