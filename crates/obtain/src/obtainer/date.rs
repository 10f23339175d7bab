// ABOUTME: Date policies: boilerplate stripping, year truncation and double-month reduction.
// ABOUTME: LocaleDateCleaner rewrites Spanish dates to ISO form before the regular date clean.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::obtainer::base::{base_clean, scalar};
use crate::obtainer::{Cleaner, Outcome, Validator};
use crate::options::DateOptions;
use crate::text::entities::decode_entities;
use crate::text::{normalize_whitespace, strip_tags};

/// Weekday names (with common misspellings) and press-release labels.
const BOILERPLATE: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "wedensday",
    "wednesay",
    "thurday",
    "thursay",
    "tuesay",
    "firday",
    "for immediate release",
    "press release",
    "news release",
    "contact:",
    "date:",
    "posted:",
    "updated:",
    "published:",
];

const PUNCTUATION: &[char] = &['.', ':', ';', '|', '•', '·', '(', ')', '[', ']', '*', '"'];

/// Date-only formats tried before falling back to `dateparser`.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // January 5, 2020
    "%B %d %Y",
    "%b %d, %Y", // Jan 5, 2020
    "%b %d %Y",
    "%d %B %Y", // 5 January 2020
    "%d %b %Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%m-%d-%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

const SPANISH_MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

static BOILERPLATE_AC: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(BOILERPLATE)
        .expect("boilerplate patterns are valid")
});

static ISO_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-\d{1,2}-\d{1,2}").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());
static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
    )
    .unwrap()
});
static RANGE_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:-|–|—|\bto\b|\bthrough\b)\s*").unwrap());
/// Only days, years and commas may sit around the separator of a range.
static RANGE_GAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s\d,]*(?:-|–|—|\bto\b|\bthrough\b)[\s\d,]*$").unwrap()
});
static SEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").unwrap());

fn month_number(name: &str) -> u32 {
    match name.get(..3).unwrap_or(name).to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        _ => 12,
    }
}

/// Cleans free-form date text down to a parseable date string.
pub struct DateCleaner {
    min_year: u32,
    max_year: u32,
}

impl DateCleaner {
    pub fn new(opts: &DateOptions) -> Self {
        Self {
            min_year: opts.min_year,
            max_year: opts.max_year,
        }
    }

    fn in_range(&self, year: &str) -> bool {
        year.parse::<u32>()
            .is_ok_and(|y| y >= self.min_year && y <= self.max_year)
    }

    /// Drops everything after the first plausible year.
    ///
    /// A leading ISO date is kept whole so its month and day survive.
    fn truncate_after_year<'s>(&self, s: &'s str) -> &'s str {
        if let Some(caps) = ISO_PREFIX_RE.captures(s) {
            if self.in_range(&caps[1]) {
                return &s[..caps[0].len()];
            }
        }
        YEAR_RE
            .captures_iter(s)
            .filter_map(|c| c.get(1))
            .find(|m| self.in_range(m.as_str()))
            .map(|m| &s[..m.end()])
            .unwrap_or(s)
    }

    pub fn clean_str(&self, raw: &str) -> String {
        let s = decode_entities(&strip_tags(&base_clean(raw)));
        let s = BOILERPLATE_AC.replace_all(&s, &vec![" "; BOILERPLATE.len()]);
        let s = s.replace(PUNCTUATION, " ");
        let s = normalize_whitespace(&s);
        // chrono and dateparser only know the three-letter "Sep".
        let s = SEPT_RE.replace_all(&s, |c: &Captures| c[0][..3].to_string());
        let s = reduce_double_month(&s);
        let s = self.truncate_after_year(s);
        s.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
            .to_string()
    }
}

impl Cleaner for DateCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        Outcome::Text(self.clean_str(&scalar(raw)))
    }
}

/// For ranges such as "March 28 - April 4, 2020" or "Dec 30, 2019 - Jan 2, 2020",
/// keeps the part after the separator.
fn reduce_double_month(s: &str) -> &str {
    let mut months = MONTH_RE.find_iter(s);
    let Some(first) = months.next() else {
        return s;
    };
    let first_number = month_number(first.as_str());
    let Some(second) = months.find(|m| month_number(m.as_str()) != first_number) else {
        return s;
    };
    let between = &s[first.end()..second.start()];
    if !RANGE_GAP_RE.is_match(between) {
        return s;
    }
    match RANGE_SEPARATOR_RE.find(between) {
        Some(sep) => &s[first.end() + sep.end()..],
        None => s,
    }
}

/// Rewrites "miércoles, 28 de febrero de 2014" style dates to "2014-02-28",
/// then applies the regular date clean.
pub struct LocaleDateCleaner {
    inner: DateCleaner,
}

impl LocaleDateCleaner {
    pub fn new(opts: &DateOptions) -> Self {
        Self {
            inner: DateCleaner::new(opts),
        }
    }
}

fn spanish_to_iso(s: &str) -> Option<String> {
    let lowered = s.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let month = tokens
        .iter()
        .find_map(|t| SPANISH_MONTHS.iter().find(|(name, _)| name == t).map(|(_, n)| *n))?;
    let day = tokens.iter().find_map(|t| {
        (t.len() <= 2 && t.chars().all(|c| c.is_ascii_digit()))
            .then(|| t.parse::<u32>().ok())
            .flatten()
            .filter(|d| (1..=31).contains(d))
    })?;
    let year = tokens
        .iter()
        .find(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()))?;

    Some(format!("{}-{:02}-{:02}", year, month, day))
}

impl Cleaner for LocaleDateCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let text = decode_entities(&strip_tags(&base_clean(&scalar(raw))));
        let rewritten = spanish_to_iso(&text).unwrap_or(text);
        Outcome::Text(self.inner.clean_str(&rewritten))
    }
}

/// Accepts dates of a minimum length that parse.
pub struct DateValidator {
    min_length: usize,
}

impl DateValidator {
    pub fn new(opts: &DateOptions) -> Self {
        Self {
            min_length: opts.min_length,
        }
    }
}

/// True if `s` parses as a date with a known format or `dateparser`.
pub fn parses_as_date(s: &str) -> bool {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
        || dateparser::parse(s).is_ok()
}

impl Validator for DateValidator {
    fn validate(&self, value: &Outcome) -> bool {
        match value {
            Outcome::Text(s) => s.chars().count() >= self.min_length && parses_as_date(s),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(s: &str) -> String {
        DateCleaner::new(&DateOptions::default()).clean_str(s)
    }

    fn valid(s: &str) -> bool {
        DateValidator::new(&DateOptions::default()).validate(&Outcome::text(s))
    }

    #[test]
    fn validation_requires_length_and_parse() {
        assert!(valid("January 5, 2020"));
        assert!(valid("2014-02-28"));
        assert!(valid("03/15/2021"));
        assert!(!valid("xyz"));
        assert!(!valid("Jan 5"));
        assert!(!valid(""));
    }

    #[test]
    fn strips_weekdays_and_labels() {
        assert_eq!(clean("Posted: Monday, January 5, 2020"), "January 5, 2020");
        assert_eq!(clean("PRESS RELEASE | Wedensday, March 3, 2021"), "March 3, 2021");
    }

    #[test]
    fn truncates_after_first_plausible_year() {
        assert_eq!(clean("January 5, 2020 10:30 AM EST"), "January 5, 2020");
        assert_eq!(clean("<span>June 3, 2021</span> (updated 2022)"), "June 3, 2021");
    }

    #[test]
    fn keeps_iso_dates_whole() {
        assert_eq!(clean("2014-02-28 08:00"), "2014-02-28");
    }

    #[test]
    fn reduces_month_ranges_to_the_end_date() {
        assert_eq!(clean("March 28 - April 4, 2020"), "April 4, 2020");
        assert_eq!(clean("May 30 through June 2, 2019"), "June 2, 2019");
        assert_eq!(clean("March 28, 2020"), "March 28, 2020");
    }

    #[test]
    fn ranges_across_a_year_keep_the_later_date() {
        let out = clean("Dec. 30, 2019 - Jan. 2, 2020");
        assert_eq!(out, "Jan 2, 2020");
        assert!(valid(&out));
    }

    #[test]
    fn prose_between_months_is_not_a_range() {
        assert_eq!(clean("June 1, 2020 - see the July schedule"), "June 1, 2020");
    }

    #[test]
    fn sept_abbreviation_validates() {
        let out = clean("Sept. 5, 2020");
        assert_eq!(out, "Sep 5, 2020");
        assert!(valid(&out));
        assert_eq!(clean("SEPT 5 - Oct 2, 2020"), "Oct 2, 2020");
    }

    #[test]
    fn spanish_dates_become_iso() {
        let cleaner = LocaleDateCleaner::new(&DateOptions::default());
        let out = cleaner.clean(Outcome::text("miércoles, 28 de febrero de 2014"));
        assert_eq!(out, Outcome::text("2014-02-28"));
        assert!(valid(out.as_str().unwrap()));
    }

    #[test]
    fn locale_cleaner_falls_back_to_plain_clean() {
        let cleaner = LocaleDateCleaner::new(&DateOptions::default());
        let out = cleaner.clean(Outcome::text("Friday, July 4, 2025"));
        assert_eq!(out, Outcome::text("July 4, 2025"));
    }
}
