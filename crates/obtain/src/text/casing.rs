// ABOUTME: Title-casing with acronym preservation and shouting detection.
// ABOUTME: Minor words stay lower-case unless they open the title.

const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "of", "on", "or", "the", "to",
];

/// Share of alphabetic characters that are upper-case (0.0 when there are none).
pub fn uppercase_ratio(s: &str) -> f64 {
    let (letters, upper) = s
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(l, u), c| (l + 1, u + usize::from(c.is_uppercase())));
    if letters == 0 {
        0.0
    } else {
        upper as f64 / letters as f64
    }
}

/// True if the uppercase ratio strictly exceeds `threshold`.
pub fn is_shouting(s: &str, threshold: f64) -> bool {
    uppercase_ratio(s) > threshold
}

/// A word with at least two letters, all of them upper-case.
fn is_acronym(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// Upper-cases the first letter, plus the letters of dotted abbreviations
/// such as "u.s." (a single letter between dots).
fn capitalize_first_letter(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());
    let mut done = false;
    for (i, &c) in chars.iter().enumerate() {
        let dotted = i > 0
            && chars[i - 1] == '.'
            && chars.get(i + 1) == Some(&'.')
            && c.is_alphabetic();
        if (!done && c.is_alphabetic()) || dotted {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Title-cases space-separated words.
///
/// Fully upper-case words are kept as acronyms; other words get an upper-case
/// first letter with the rest left untouched.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .enumerate()
        .map(|(i, word)| {
            if is_acronym(word) {
                word.to_string()
            } else if i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
                word.to_lowercase()
            } else {
                capitalize_first_letter(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-cases `s`, lower-casing it first when it is shouting.
pub fn title_case_with_threshold(s: &str, shouting_threshold: f64) -> String {
    if is_shouting(s, shouting_threshold) {
        title_case(&s.to_lowercase())
    } else {
        title_case(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_ignores_non_letters() {
        assert_eq!(uppercase_ratio("AB12!"), 1.0);
        assert_eq!(uppercase_ratio("1234"), 0.0);
        assert_eq!(uppercase_ratio("Ab"), 0.5);
    }

    #[test]
    fn shouting_is_lowered_then_title_cased() {
        assert_eq!(
            title_case_with_threshold("STATE OF THE UNION", 0.955),
            "State of the Union"
        );
    }

    #[test]
    fn acronyms_survive_normal_titles() {
        assert_eq!(
            title_case_with_threshold("the FBI announces a new policy for NASA", 0.955),
            "The FBI Announces a New Policy for NASA"
        );
    }

    #[test]
    fn threshold_is_strict() {
        // 21 upper, 1 lower: ratio ~0.954, below the default threshold.
        let almost = "ABCDEFGHIJK LMNOPQRSTUv";
        assert!(!is_shouting(almost, 0.955));
        assert!(is_shouting("ABCDEFGHIJKLMNOPQRSTUVWXYZ", 0.955));
    }

    #[test]
    fn dotted_abbreviations_stay_upper_case() {
        assert_eq!(
            title_case_with_threshold("WHAT'S NEW AT THE U.S. EPA", 0.955),
            "What's New at the U.S. Epa"
        );
        assert_eq!(title_case("visit city.gov"), "Visit City.gov");
    }

    #[test]
    fn leading_punctuation_is_skipped() {
        assert_eq!(title_case("(draft) report"), "(Draft) Report");
    }
}
