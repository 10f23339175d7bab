// ABOUTME: Encoding repair for page bytes that are not valid UTF-8.
// ABOUTME: Tries a fixed, ordered list of candidate encodings and never fails.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Decodes `bytes` to a String.
///
/// Valid UTF-8 is taken as-is. Otherwise each candidate label is tried in
/// order without replacement characters and the first clean decode wins.
/// When no candidate decodes cleanly the text passes through lossily.
pub fn to_utf8(bytes: &[u8], candidates: &[String]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    for label in candidates {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            tracing::debug!(label = label.as_str(), "unknown candidate encoding");
            continue;
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            tracing::debug!(encoding = encoding.name(), "repaired page encoding");
            return text.into_owned();
        }
    }
    tracing::debug!("no candidate encoding decoded cleanly; passing text through");
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
