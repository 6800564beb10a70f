// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parser for Tesseract's TSV output.
//
// Columns: level page_num block_num par_num line_num word_num left top width
// height conf text. Only level-5 rows are words; the others describe pages,
// blocks, paragraphs, and lines.

use idscan_core::{LineKey, RecognizedWord, WordSet};
use tracing::debug;

const WORD_LEVEL: u32 = 5;
const MIN_COLUMNS: usize = 11;

/// Turn TSV output into words in reading order. Rows that are not words, are
/// malformed, or carry only whitespace are skipped. An unparsable confidence
/// becomes -1.
pub fn parse_tsv(tsv: &str) -> WordSet {
    let mut words = WordSet::new();
    let mut skipped = 0usize;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < MIN_COLUMNS {
            skipped += 1;
            continue;
        }
        let level: u32 = cols[0].trim().parse().unwrap_or(0);
        if level != WORD_LEVEL {
            continue;
        }
        let text = cols.get(11).map(|t| t.trim()).unwrap_or_default();
        if text.is_empty() {
            continue;
        }

        let number = |idx: usize| cols[idx].trim().parse::<i32>().unwrap_or(0);
        let line_key = LineKey::new(
            number(2).max(0) as u32,
            number(3).max(0) as u32,
            number(4).max(0) as u32,
        );
        let confidence = cols[10].trim().parse::<f32>().unwrap_or(-1.0);

        words.push(RecognizedWord::new(text, number(7), number(9), confidence).with_line_key(line_key));
    }

    debug!(words = words.len(), skipped, "Parsed Tesseract TSV");
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn parses_word_rows_only() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t20\t300\t40\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t20\t120\t40\t96.5\tDELACRUZ\n\
             5\t1\t1\t1\t1\t2\t140\t22\t200\t30\t88\t2021-00345-MN-0\n"
        );
        let words = parse_tsv(&tsv);
        assert_eq!(words.len(), 2);

        let first = &words.as_slice()[0];
        assert_eq!(first.text, "DELACRUZ");
        assert_eq!(first.top, 20);
        assert_eq!(first.height, 40);
        assert_eq!(first.confidence, 96.5);
        assert_eq!(first.line_key, LineKey::new(1, 1, 1));
    }

    #[test]
    fn blank_words_and_short_rows_are_skipped() {
        let tsv = format!(
            "{HEADER}\n\
             5\t1\t1\t1\t1\t1\t10\t20\t120\t40\t95\t   \n\
             5\t1\t1\n\
             5\t1\t2\t1\t3\t1\t10\t200\t120\t40\t95\tGARCIA\n"
        );
        let words = parse_tsv(&tsv);
        assert_eq!(words.len(), 1);
        assert_eq!(words.as_slice()[0].line_key, LineKey::new(2, 1, 3));
    }

    #[test]
    fn bad_confidence_becomes_unknown() {
        let tsv = format!("{HEADER}\n5\t1\t1\t1\t1\t1\t0\t5\t10\t12\tn/a\tSANTOS\n");
        let words = parse_tsv(&tsv);
        assert_eq!(words.as_slice()[0].confidence, -1.0);
    }

    #[test]
    fn empty_output_gives_empty_set() {
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv(HEADER).is_empty());
    }
}
