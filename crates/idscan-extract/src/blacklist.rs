// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Words that can never be a surname: institutional boilerplate printed on
// every card, plus shapes that only OCR noise produces.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Lowercase boilerplate words found on the card template.
pub static BOILERPLATE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "university",
        "college",
        "philippines",
        "republic",
        "diploma",
        "bachelor",
        "technology",
        "camera",
        "report",
        "student",
        "department",
        "institute",
        "school",
        "polytechnic",
        "information",
    ]
    .into_iter()
    .collect()
});

/// "Philippines" is misread in many ways; any of these fragments rules a
/// token out.
static PHILIPPINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)philipp|philip|phillip").expect("valid regex"));

/// True for boilerplate, Philippines variants, and tokens with a character
/// repeated three times in a row.
pub fn is_blacklisted(token: &str) -> bool {
    BOILERPLATE.contains(token.to_lowercase().as_str())
        || PHILIPPINES_RE.is_match(token)
        || has_triple_repeat(token)
}

/// Detect a run of three identical characters, ignoring case ("LLl" counts).
pub fn has_triple_repeat(token: &str) -> bool {
    let folded: Vec<char> = token.chars().flat_map(char::to_lowercase).collect();
    folded.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}
