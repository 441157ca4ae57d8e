//! Canonicalisation of human-entered identifiers and page text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form of a player or server name.
///
/// Decomposes (NFD), drops every character that is not alphanumeric
/// (underscores and combining marks included), then lowercases.
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// [`normalize`] over an optional input; absent yields the empty string.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

/// Diacritic- and case-insensitive form of free text, keeping word boundaries.
///
/// Whitespace runs collapse to a single space so phrase matching is not
/// defeated by line breaks in rendered page text.
pub fn fold_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_punctuation() {
        assert_eq!(normalize("Mário_Rossi-99"), "mariorossi99");
        assert_eq!(normalize("  Ünïcode  "), "unicode");
        assert_eq!(normalize("Über Player #1"), "uberplayer1");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["Mário_Rossi-99", "İstanbul", "ÅNGSTRÖM", "x\u{0301}y", "Ǆemal", "ß-Straße"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Al")), "al");
    }

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Hai  GIÀ\nvotato oggi "), "hai gia votato oggi");
        assert_eq!(fold_text(""), "");
        assert_eq!(fold_text("   "), "");
    }
}
