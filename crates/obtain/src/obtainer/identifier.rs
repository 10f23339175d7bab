// ABOUTME: Identifier policy for short hyphenated codes such as "CR-1234".
// ABOUTME: Cleaning drops "ID:" style labels; validation checks length and a single hyphen.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::obtainer::base::{base_clean, scalar};
use crate::obtainer::{Cleaner, Outcome, Validator};
use crate::options::IdentifierOptions;
use crate::text::entities::decode_entities;
use crate::text::transliterate::transliterate;
use crate::text::{normalize_whitespace, strip_tags};

static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bid\s*[:#]|^\s*id\s+").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifierCleaner;

impl Cleaner for IdentifierCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let s = decode_entities(&strip_tags(&base_clean(&scalar(raw))));
        let s = LABEL_RE.replace_all(&s, " ");
        Outcome::Text(normalize_whitespace(&transliterate(&s)))
    }
}

pub struct IdentifierValidator {
    min_chars: usize,
    max_chars: usize,
}

impl IdentifierValidator {
    pub fn new(opts: &IdentifierOptions) -> Self {
        Self {
            min_chars: opts.min_chars,
            max_chars: opts.max_chars,
        }
    }
}

impl Validator for IdentifierValidator {
    fn validate(&self, value: &Outcome) -> bool {
        let Outcome::Text(s) = value else {
            return false;
        };
        let len = s.chars().count();
        len >= self.min_chars && len <= self.max_chars && s.matches('-').count() == 1
    }
}
