// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// idscan-extract — Field extraction from noisy OCR output.
//
// Two extractors run over every scan: the student number comes from ordered
// pattern matching over the plain text, the surname from word geometry with
// progressively weaker fallbacks. Both return an empty string on a miss.

pub mod blacklist;
pub mod id_code;
pub mod surname;

pub use blacklist::is_blacklisted;
pub use id_code::{IdPattern, find_student_number, match_student_number};
pub use surname::{SurnameLocator, SurnameMatch, SurnameStage};
