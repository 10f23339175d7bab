// ABOUTME: HTML entity decoding for extracted values.
// ABOUTME: Decodes numeric character references and the common named entities legacy pages use.

/// Named entities seen in legacy CMS exports.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", "\u{a0}"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&lsquo;", "‘"),
    ("&rsquo;", "’"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&hellip;", "…"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&copy;", "©"),
    ("&reg;", "®"),
    ("&trade;", "™"),
    ("&bull;", "•"),
    ("&middot;", "·"),
    ("&deg;", "°"),
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&ntilde;", "ñ"),
    ("&Aacute;", "Á"),
    ("&Eacute;", "É"),
    ("&Iacute;", "Í"),
    ("&Oacute;", "Ó"),
    ("&Uacute;", "Ú"),
    ("&Ntilde;", "Ñ"),
    ("&uuml;", "ü"),
    ("&ouml;", "ö"),
    ("&auml;", "ä"),
    ("&ccedil;", "ç"),
];

/// Decodes named and numeric entities.
///
/// `&amp;` is decoded last so `&amp;lt;` yields `&lt;` rather than `<`.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut result = decode_numeric_entities(s);
    for (entity, replacement) in NAMED_ENTITIES.iter().skip(1) {
        if result.contains(entity) {
            result = result.replace(entity, replacement);
        }
    }
    result.replace("&amp;", "&")
}

/// Decodes numeric character references like `&#233;` and `&#xE9;`.
///
/// Malformed or out-of-range references are kept verbatim.
pub fn decode_numeric_entities(s: &str) -> String {
    if !s.contains("&#") {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("&#") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos + 2..];
        match parse_reference(candidate) {
            Some((ch, consumed)) => {
                result.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                result.push_str("&#");
                rest = candidate;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Parses the part after `&#`; returns the char and bytes consumed (incl. `;`).
fn parse_reference(s: &str) -> Option<(char, usize)> {
    let (digits_start, radix) = match s.as_bytes().first() {
        Some(b'x') | Some(b'X') => (1, 16),
        _ => (0, 10),
    };
    let digits: String = s[digits_start..]
        .chars()
        .take_while(|c| c.is_digit(radix))
        .collect();
    if digits.is_empty() {
        return None;
    }
    let mut consumed = digits_start + digits.len();
    if s[consumed..].starts_with(';') {
        consumed += 1;
    }
    let code = u32::from_str_radix(&digits, radix).ok()?;
    let ch = char::from_u32(code).filter(|c| *c != '\0')?;
    Some((ch, consumed))
}
