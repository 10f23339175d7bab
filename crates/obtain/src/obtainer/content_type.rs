// ABOUTME: Content-type policy: rules yield a configured tag, which is kept as-is when non-empty.

use crate::obtainer::{Cleaner, Outcome, Validator};

#[derive(Debug, Default, Clone, Copy)]
pub struct TagCleaner;

impl Cleaner for TagCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        match raw {
            Outcome::Text(s) | Outcome::Tag(s) => Outcome::Tag(s.trim().to_string()),
            Outcome::Records(_) => Outcome::Tag(String::new()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TagValidator;

impl Validator for TagValidator {
    fn validate(&self, value: &Outcome) -> bool {
        matches!(value, Outcome::Tag(s) if !s.is_empty())
    }
}
