// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Student number extraction.
//
// Student numbers have the shape `dddd-ddddd-MN-0` (year, sequence, campus
// code, check digit). OCR output mangles the separators, so the text is tried
// against a list of patterns from the strictest to the loosest. The first
// pattern that matches anywhere in the text wins and later patterns are not
// consulted, which keeps the loose pattern from grabbing an unrelated
// digit-MN-digit run out of boilerplate.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[-–—]\d{5,}[-–—]MN[-–—]0\b").expect("valid regex"));
static ANY_CHECK_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[-–—]\d{5,}[-–—]MN[-–—]\d\b").expect("valid regex"));
static SPACED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[-\s]\d{5,}[-\s]MN[-\s]\d\b").expect("valid regex"));
static LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3,}[-/ ]\d{4,}[-/ ]MN[-/ ]\d\b").expect("valid regex"));

/// The student number matchers, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPattern {
    /// `dddd-ddddd+-MN-0` with hyphen, en-dash, or em-dash separators.
    Canonical,
    /// As `Canonical`, but any check digit.
    AnyCheckDigit,
    /// Each separator a hyphen or any whitespace, so numbers split across
    /// lines or joined by tabs still match. Returned as found.
    Spaced,
    /// `ddd+?dddd+?MN?d` where `?` is a hyphen, slash, or space.
    Loose,
}

impl IdPattern {
    pub const ORDERED: [IdPattern; 4] = [
        IdPattern::Canonical,
        IdPattern::AnyCheckDigit,
        IdPattern::Spaced,
        IdPattern::Loose,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            Self::Canonical => &CANONICAL_RE,
            Self::AnyCheckDigit => &ANY_CHECK_DIGIT_RE,
            Self::Spaced => &SPACED_RE,
            Self::Loose => &LOOSE_RE,
        }
    }

    /// Dash-separated matches are rewritten with plain hyphens.
    fn normalizes_dashes(self) -> bool {
        matches!(self, Self::Canonical | Self::AnyCheckDigit)
    }

    /// Try this pattern alone against `text`.
    pub fn find(self, text: &str) -> Option<String> {
        let found = self.regex().find(text)?.as_str();
        if self.normalizes_dashes() {
            Some(found.replace(['–', '—'], "-"))
        } else {
            Some(found.to_string())
        }
    }
}

/// Run the patterns in order and report which one matched.
pub fn match_student_number(text: &str) -> Option<(IdPattern, String)> {
    IdPattern::ORDERED
        .into_iter()
        .find_map(|pattern| pattern.find(text).map(|found| (pattern, found)))
}

/// Best student number in `text`, or an empty string.
pub fn find_student_number(text: &str) -> String {
    match match_student_number(text) {
        Some((pattern, found)) => {
            debug!(?pattern, student_number = %found, "Student number matched");
            found
        }
        None => {
            debug!("No student number pattern matched");
            String::new()
        }
    }
}
