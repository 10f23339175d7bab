// ABOUTME: Title policy: markup and junk removal, transliteration, shouting-aware title casing.
// ABOUTME: Processing truncates word-safe and reports the discarded remainder at error severity.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::Reporter;
use crate::obtainer::base::{base_clean, scalar};
use crate::obtainer::{Cleaner, Outcome, Processor};
use crate::options::TitleOptions;
use crate::text::casing::title_case_with_threshold;
use crate::text::entities::decode_entities;
use crate::text::transliterate::transliterate;
use crate::text::truncate::truncate_word_safe;
use crate::text::{normalize_whitespace, strip_tags};

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>|\r\n|\r|\n|\t").unwrap());

pub struct TitleCleaner {
    junk: Option<AhoCorasick>,
    shouting_threshold: f64,
}

impl TitleCleaner {
    pub fn new(opts: &TitleOptions) -> Self {
        let patterns: Vec<&str> = opts
            .junk
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();
        let junk = if patterns.is_empty() {
            None
        } else {
            AhoCorasickBuilder::new()
                .ascii_case_insensitive(true)
                .match_kind(MatchKind::LeftmostLongest)
                .build(&patterns)
                .ok()
        };
        Self {
            junk,
            shouting_threshold: opts.shouting_threshold,
        }
    }

    fn remove_junk(&self, s: &str) -> String {
        match &self.junk {
            Some(ac) => ac.replace_all(s, &vec![" "; ac.patterns_len()]),
            None => s.to_string(),
        }
    }
}

impl Cleaner for TitleCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let s = base_clean(&scalar(raw));
        let s = LINE_BREAK_RE.replace_all(&s, " ");
        let s = decode_entities(&strip_tags(&s));
        let s = self.remove_junk(&s);
        let s = normalize_whitespace(&transliterate(&s));
        Outcome::Text(title_case_with_threshold(&s, self.shouting_threshold))
    }
}

pub struct TitleTruncator {
    max_length: usize,
    min_word_length: usize,
}

impl TitleTruncator {
    pub fn new(opts: &TitleOptions) -> Self {
        Self {
            max_length: opts.max_length,
            min_word_length: opts.min_word_length,
        }
    }
}

impl Processor for TitleTruncator {
    fn process(&self, value: Outcome, report: &mut Reporter<'_>) -> Outcome {
        let Outcome::Text(title) = value else {
            return value;
        };
        let cut = truncate_word_safe(&title, self.max_length, self.min_word_length);
        if !cut.remainder.is_empty() {
            let max = self.max_length.to_string();
            report.error(
                "@field was truncated to @max characters; discarded: '@discarded'",
                &[("max", max.as_str()), ("discarded", cut.remainder.as_str())],
            );
        }
        Outcome::Text(cut.kept)
    }
}
