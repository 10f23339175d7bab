// ABOUTME: Translates the XPath subset used by migration rules into equivalent CSS selectors.
// ABOUTME: Supports child/descendant steps, positional, last(), and attribute predicates.

//! XPath subset translation.
//!
//! Legacy job configurations carry XPath expressions copied from browser dev
//! tools (`/html/body/div[2]/p[1]`, `//div[@class='story']//a`). These are
//! translated to CSS so that every query goes through one selector engine.
//!
//! Positional predicates translate to `:nth-of-type` (or `:nth-child` on
//! `*`), which matches XPath semantics only when the position comes before
//! any attribute predicate on the same step; the reverse order is rejected.

use crate::error::{ObtainError, Result};

#[derive(Debug, PartialEq)]
enum Axis {
    Child,
    Descendant,
}

fn unsupported(expr: &str, why: &str) -> ObtainError {
    ObtainError::xpath(expr, "translate xpath", Some(anyhow::anyhow!("{}", why)))
}

/// Translates an XPath expression into a CSS selector.
pub fn to_css(expr: &str) -> Result<String> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(unsupported(expr, "empty expression"));
    }
    // Text is taken from the element anyway.
    let body = trimmed.strip_suffix("/text()").unwrap_or(trimmed);

    let mut out = String::new();
    let mut rest = body;
    let mut first = true;

    while !rest.is_empty() {
        let (axis, after) = if let Some(r) = rest.strip_prefix("//") {
            (Axis::Descendant, r)
        } else if let Some(r) = rest.strip_prefix('/') {
            (Axis::Child, r)
        } else if first {
            // Relative paths behave like descendant searches from the root.
            (Axis::Descendant, rest)
        } else {
            return Err(unsupported(expr, "expected '/' between steps"));
        };

        let step_len = step_length(after);
        if step_len == 0 {
            return Err(unsupported(expr, "empty location step"));
        }
        let step = translate_step(expr, &after[..step_len])?;

        if first {
            out.push_str(&step);
            if axis == Axis::Child {
                out.push_str(":root");
            }
        } else {
            match axis {
                Axis::Child => out.push_str(" > "),
                Axis::Descendant => out.push(' '),
            }
            out.push_str(&step);
        }
        first = false;
        rest = &after[step_len..];
    }

    Ok(out)
}

/// Length of the step at the start of `s`, honoring brackets and quotes.
fn step_length(s: &str) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => return i,
            _ => {}
        }
    }
    s.len()
}

fn translate_step(expr: &str, step: &str) -> Result<String> {
    let name_end = step.find('[').unwrap_or(step.len());
    let name = step[..name_end].trim();
    if name.contains("::") || name.contains('(') || name.starts_with('@') || name == ".." || name == "." {
        return Err(unsupported(expr, "axes, functions and attribute steps are not supported"));
    }
    if name != "*" && !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(unsupported(expr, "invalid element name"));
    }
    let universal = name == "*";
    let mut css = name.to_ascii_lowercase();

    let mut rest = &step[name_end..];
    let mut seen_attribute = false;
    while !rest.is_empty() {
        let Some(inner_and_tail) = rest.strip_prefix('[') else {
            return Err(unsupported(expr, "unexpected text after predicate"));
        };
        let close = predicate_end(inner_and_tail)
            .ok_or_else(|| unsupported(expr, "unterminated predicate"))?;
        let predicate = inner_and_tail[..close].trim();
        rest = &inner_and_tail[close + 1..];

        if let Ok(n) = predicate.parse::<usize>() {
            if seen_attribute {
                return Err(unsupported(expr, "position after attribute predicate"));
            }
            if n == 0 {
                return Err(unsupported(expr, "positions are 1-based"));
            }
            let pseudo = if universal { "nth-child" } else { "nth-of-type" };
            css.push_str(&format!(":{}({})", pseudo, n));
        } else if predicate == "last()" {
            if seen_attribute {
                return Err(unsupported(expr, "position after attribute predicate"));
            }
            css.push_str(if universal { ":last-child" } else { ":last-of-type" });
        } else {
            for clause in split_and(predicate) {
                css.push_str(&translate_attribute(expr, clause.trim())?);
            }
            seen_attribute = true;
        }
    }
    Ok(css)
}

fn predicate_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits on ` and ` outside of quotes.
fn split_and(predicate: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    let bytes = predicate.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if bytes[i..].starts_with(b" and ") => {
                parts.push(&predicate[start..i]);
                i += 5;
                start = i;
                continue;
            }
            None => {}
        }
        i += 1;
    }
    parts.push(&predicate[start..]);
    parts
}

fn translate_attribute(expr: &str, clause: &str) -> Result<String> {
    for (func, op) in [("contains(", "*="), ("starts-with(", "^=")] {
        if let Some(args) = clause.strip_prefix(func) {
            let args = args
                .strip_suffix(')')
                .ok_or_else(|| unsupported(expr, "unterminated function call"))?;
            let (attr, value) = args
                .split_once(',')
                .ok_or_else(|| unsupported(expr, "function needs two arguments"))?;
            let attr = attribute_name(expr, attr.trim())?;
            let value = literal(expr, value.trim())?;
            return Ok(format!("[{}{}\"{}\"]", attr, op, escape(&value)));
        }
    }

    if let Some((attr, value)) = clause.split_once('=') {
        let attr = attribute_name(expr, attr.trim())?;
        let value = literal(expr, value.trim())?;
        return Ok(format!("[{}=\"{}\"]", attr, escape(&value)));
    }

    let attr = attribute_name(expr, clause)?;
    Ok(format!("[{}]", attr))
}

fn attribute_name<'a>(expr: &str, s: &'a str) -> Result<&'a str> {
    let name = s
        .strip_prefix('@')
        .ok_or_else(|| unsupported(expr, "only attribute predicates are supported"))?;
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
    {
        return Err(unsupported(expr, "invalid attribute name"));
    }
    Ok(name)
}

fn literal(expr: &str, s: &str) -> Result<String> {
    let quoted = (s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"'));
    if s.len() < 2 || !quoted {
        return Err(unsupported(expr, "expected a quoted literal"));
    }
    Ok(s[1..s.len() - 1].to_string())
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_anchors_at_root() {
        assert_eq!(
            to_css("/html/body/div[2]/p[1]").unwrap(),
            "html:root > body > div:nth-of-type(2) > p:nth-of-type(1)"
        );
    }

    #[test]
    fn descendant_steps_and_attributes() {
        assert_eq!(
            to_css("//div[@class='story']//a[@href]").unwrap(),
            "div[class=\"story\"] a[href]"
        );
    }

    #[test]
    fn contains_and_starts_with() {
        assert_eq!(
            to_css("//div[contains(@class, 'crumb') and starts-with(@id, 'nav')]").unwrap(),
            "div[class*=\"crumb\"][id^=\"nav\"]"
        );
    }

    #[test]
    fn last_and_universal_positions() {
        assert_eq!(to_css("//ul/li[last()]").unwrap(), "ul > li:last-of-type");
        assert_eq!(to_css("//td/*[3]").unwrap(), "td > *:nth-child(3)");
    }

    #[test]
    fn trailing_text_node_is_ignored() {
        assert_eq!(to_css("//h1/text()").unwrap(), "h1");
    }

    #[test]
    fn relative_path_is_descendant() {
        assert_eq!(to_css("table/tr").unwrap(), "table > tr");
    }

    #[test]
    fn rejects_outside_subset() {
        assert!(to_css("").unwrap_err().is_xpath());
        assert!(to_css("//div/following-sibling::p").unwrap_err().is_xpath());
        assert!(to_css("//div[@class='a'][2]").unwrap_err().is_xpath());
        assert!(to_css("//p[text()='x']").unwrap_err().is_xpath());
        assert!(to_css("//a/@href").unwrap_err().is_xpath());
    }
}
