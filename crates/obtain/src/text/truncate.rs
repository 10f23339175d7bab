// ABOUTME: Word-safe truncation that reports the discarded remainder.
// ABOUTME: Lengths are counted in characters, not bytes.

/// Result of a truncation: what was kept and what was cut off (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub kept: String,
    pub remainder: String,
}

/// Truncates `s` to at most `max_len` characters at a word boundary.
///
/// The cut lands on the last whitespace within the limit, provided the kept
/// text is at least `min_word_len` characters long; otherwise the text is
/// cut hard at `max_len`.
pub fn truncate_word_safe(s: &str, max_len: usize, min_word_len: usize) -> Truncated {
    let total = s.chars().count();
    if total <= max_len {
        return Truncated {
            kept: s.to_string(),
            remainder: String::new(),
        };
    }

    let hard_end = byte_index(s, max_len);
    // If the limit falls just before whitespace the whole prefix is word-safe.
    let next_is_space = s[hard_end..].chars().next().is_some_and(char::is_whitespace);

    let cut = if next_is_space {
        hard_end
    } else {
        match s[..hard_end].rfind(char::is_whitespace) {
            Some(ws) if s[..ws].trim_end().chars().count() >= min_word_len => ws,
            _ => hard_end,
        }
    };

    Truncated {
        kept: s[..cut].trim_end().to_string(),
        remainder: s[cut..].trim().to_string(),
    }
}

fn byte_index(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}
