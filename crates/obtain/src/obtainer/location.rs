// ABOUTME: City, state and country policies: tag stripping, whitespace normalization, bounds checks.
// ABOUTME: State values are canonically cased and must name a US state or postal code.

use crate::obtainer::base::scalar;
use crate::obtainer::{Cleaner, Outcome, Validator};
use crate::options::LocationBounds;
use crate::text::casing::title_case;
use crate::text::entities::decode_entities;
use crate::text::{normalize_whitespace, strip_tags};

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// True if `s` is a US state name or USPS code, ignoring case.
pub fn is_us_state(s: &str) -> bool {
    US_STATES
        .iter()
        .any(|(code, name)| code.eq_ignore_ascii_case(s) || name.eq_ignore_ascii_case(s))
}

pub struct LocationCleaner {
    canonical_state_case: bool,
}

impl LocationCleaner {
    /// City and country cleaning.
    pub fn plain() -> Self {
        Self {
            canonical_state_case: false,
        }
    }

    /// Like `plain`, then postal codes upper-cased and names title-cased.
    pub fn state() -> Self {
        Self {
            canonical_state_case: true,
        }
    }
}

impl Cleaner for LocationCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        let s = normalize_whitespace(&decode_entities(&strip_tags(&scalar(raw))));
        if !self.canonical_state_case {
            return Outcome::Text(s);
        }
        let cased = if s.chars().count() == 2 {
            s.to_uppercase()
        } else {
            title_case(&s.to_lowercase())
        };
        Outcome::Text(cased)
    }
}

pub struct BoundsValidator {
    bounds: LocationBounds,
}

impl BoundsValidator {
    pub fn new(bounds: LocationBounds) -> Self {
        Self { bounds }
    }
}

impl Validator for BoundsValidator {
    fn validate(&self, value: &Outcome) -> bool {
        matches!(value, Outcome::Text(s) if self.bounds.admits(s))
    }
}

/// Bounds plus membership in the US state list.
pub struct StateValidator {
    bounds: LocationBounds,
}

impl StateValidator {
    pub fn new(bounds: LocationBounds) -> Self {
        Self { bounds }
    }
}

impl Validator for StateValidator {
    fn validate(&self, value: &Outcome) -> bool {
        matches!(value, Outcome::Text(s) if self.bounds.admits(s) && is_us_state(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ObtainOptions;

    fn state(raw: &str) -> (Outcome, bool) {
        let opts = ObtainOptions::default();
        let cleaned = LocationCleaner::state().clean(Outcome::text(raw));
        let ok = StateValidator::new(opts.state).validate(&cleaned);
        (cleaned, ok)
    }

    #[test]
    fn states_by_code_and_name() {
        assert_eq!(state("ca"), (Outcome::text("CA"), true));
        assert_eq!(state(" <b>CALIFORNIA</b> "), (Outcome::text("California"), true));
        assert_eq!(state("new   york"), (Outcome::text("New York"), true));
    }

    #[test]
    fn unknown_or_oversized_states_fail() {
        assert!(!state("Californiaaa").1);
        assert!(!state("Tokyo").1);
        assert!(!state("C").1);
    }

    #[test]
    fn long_state_names_need_wider_bounds() {
        // "North Carolina" is 14 characters.
        assert!(!state("North Carolina").1);
        let wide = StateValidator::new(LocationBounds::new(2, 14, 2));
        assert!(wide.validate(&Outcome::text("North Carolina")));
    }

    #[test]
    fn cities_check_bounds_only() {
        let opts = ObtainOptions::default();
        let cleaned = LocationCleaner::plain().clean(Outcome::text("  San&nbsp;Diego "));
        assert_eq!(cleaned, Outcome::text("San Diego"));
        assert!(BoundsValidator::new(opts.city).validate(&cleaned));
        assert!(!BoundsValidator::new(opts.city).validate(&Outcome::text("Santa Clara County")));
        assert!(!BoundsValidator::new(opts.country).validate(&Outcome::text("X")));
    }
}
