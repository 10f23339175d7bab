// ABOUTME: Base clean/validate policies shared by scalar kinds, plus the markup and plain-text variants.
// ABOUTME: Base cleaning is idempotent: it repeats its passes until the value stops changing.

use crate::obtainer::{Cleaner, Outcome, Validator};
use crate::text::entities::decode_numeric_entities;
use crate::text::{html_to_text_with_breaks, strip_legacy_artifacts, strip_tags};

/// Decodes numeric references, strips legacy artifacts and trims.
///
/// Each pass can only shorten the text or swap a non-breaking space for a
/// plain one, so iterating to a fixpoint terminates and makes the result
/// stable under repeated cleaning.
pub fn base_clean(s: &str) -> String {
    let mut current = s.trim().to_string();
    loop {
        let next = strip_legacy_artifacts(&decode_numeric_entities(&current))
            .trim()
            .to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Coerces any outcome to a scalar string.
///
/// Records are not scalars; they become empty text, which fails validation.
pub(crate) fn scalar(raw: Outcome) -> String {
    match raw {
        Outcome::Text(s) | Outcome::Tag(s) => s,
        Outcome::Records(_) => String::new(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BaseCleaner;

impl Cleaner for BaseCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        Outcome::Text(base_clean(&scalar(raw)))
    }
}

/// Rejects empty values and anything that is not scalar text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyText;

impl Validator for NonEmptyText {
    fn validate(&self, value: &Outcome) -> bool {
        matches!(value, Outcome::Text(s) if !s.is_empty())
    }
}

/// Keeps markup as markup; only artifacts and surrounding whitespace go.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupCleaner;

impl Cleaner for MarkupCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let mut current = scalar(raw).trim().to_string();
        loop {
            let next = strip_legacy_artifacts(&current).trim().to_string();
            if next == current {
                return Outcome::Text(next);
            }
            current = next;
        }
    }
}

/// Markup must carry visible text or an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupValidator;

impl Validator for MarkupValidator {
    fn validate(&self, value: &Outcome) -> bool {
        match value {
            Outcome::Text(s) if !s.is_empty() => {
                !strip_tags(s).trim().is_empty() || s.to_lowercase().contains("<img")
            }
            _ => false,
        }
    }
}

/// Turns paragraph and break markup into blank lines and newlines.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextCleaner;

impl Cleaner for PlainTextCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let markup = base_clean(&scalar(raw));
        Outcome::Text(html_to_text_with_breaks(&markup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "  plain  ",
        "Caf&#233;&#160;",
        "&#38;#233;",
        "&#38;#38;#60;o:p&#62;",
        "\u{feff}Title\r\n<o:p></o:p>",
        "Â\u{a0}x\u{a0}",
        "&#x26;#x26;#x26;",
        "<![CDATA[ cdata ]]>",
        "",
        "&#13;&#10; &#32;",
    ];

    #[test]
    fn base_clean_is_idempotent() {
        for s in SAMPLES {
            let once = base_clean(s);
            assert_eq!(base_clean(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn base_clean_decodes_and_trims() {
        assert_eq!(base_clean("  Caf&#233;&#160; "), "Café");
        assert_eq!(base_clean("\u{feff}Title\r\n<o:p></o:p>"), "Title");
    }

    #[test]
    fn non_scalar_is_rejected() {
        let cleaned = BaseCleaner.clean(Outcome::Records(vec![serde_json::json!("x")]));
        assert!(!NonEmptyText.validate(&cleaned));
        assert!(!NonEmptyText.validate(&Outcome::Tag("x".into())));
    }

    #[test]
    fn markup_cleaner_keeps_tags() {
        let out = MarkupCleaner.clean(Outcome::text("  <p>Hi</p><o:p></o:p> "));
        assert_eq!(out, Outcome::text("<p>Hi</p>"));
        assert!(MarkupValidator.validate(&out));
        assert!(!MarkupValidator.validate(&Outcome::text("<p> </p>")));
        assert!(MarkupValidator.validate(&Outcome::text("<img src=\"a.png\">")));
    }

    #[test]
    fn plain_text_cleaner_keeps_paragraphs() {
        let out = PlainTextCleaner.clean(Outcome::text("<p>One &#38; two</p><p>Three<br>four</p>"));
        assert_eq!(out, Outcome::text("One & two\n\nThree\nfour"));
    }
}
