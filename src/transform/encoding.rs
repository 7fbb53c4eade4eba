use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

// Order matters: multi-char mojibake sequences before their single-char tails.
const REPLACEMENTS: &[(&str, &str)] = &[
    // UTF-8 read as Windows-1252
    ("â€™", "'"),
    ("â€œ", "\""),
    ("â€\u{9d}", "\""),
    ("â€”", "—"),
    ("â€“", "–"),
    ("ï¬\u{81}", "ﬁ"),
    ("ï¬‚", "ﬂ"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã¢", "â"),
    ("Ã´", "ô"),
    ("Ã®", "î"),
    ("Ã»", "û"),
    ("Ã§", "ç"),
    // Windows-1252 control range surfacing as C1 controls
    ("\u{92}", "'"),
    ("\u{93}", "\""),
    ("\u{94}", "\""),
    ("\u{96}", "–"),
    ("\u{97}", "—"),
    // Latin-1
    ("\u{a0}", " "),
    ("\u{ad}", ""),
];

pub fn normalize_to_utf8(text: &str) -> String {
    let mut out = text.to_string();
    for (old, new) in REPLACEMENTS {
        if out.contains(old) {
            out = out.replace(old, new);
        }
    }
    out
}

pub fn strip_null_bytes(text: &str) -> String {
    text.replace('\0', "")
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Turns literal `\u0041`-style escapes back into the characters they name.
pub fn fix_unicode_escapes(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").unwrap());
    RE.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeForm {
    Nfc,
    Nfkc,
}

impl UnicodeForm {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "nfc" => Ok(UnicodeForm::Nfc),
            "nfkc" => Ok(UnicodeForm::Nfkc),
            other => Err(Error::config(format!(
                "normalize_unicode: unsupported form `{other}` (expected nfc or nfkc)"
            ))),
        }
    }
}

pub fn normalize_unicode(text: &str, form: UnicodeForm) -> String {
    match form {
        UnicodeForm::Nfc => text.nfc().collect(),
        UnicodeForm::Nfkc => text.nfkc().collect(),
    }
}

/// Drops control characters, keeping the structural ones (`\n`, `\r`, `\t`).
pub fn sanitize_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_windows_artifacts() {
        let text = "It\u{92}s a test\u{97}with dashes";
        assert_eq!(normalize_to_utf8(text), "It's a test—with dashes");
    }

    #[test]
    fn repairs_mojibake_into_ligature() {
        assert_eq!(normalize_to_utf8("Ã©clair ï¬\u{81}rst"), "éclair ﬁrst");
    }

    #[test]
    fn line_endings() {
        assert_eq!(
            normalize_line_endings("Line1\r\nLine2\rLine3\n"),
            "Line1\nLine2\nLine3\n"
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(fix_unicode_escapes(r"\u0041BC \uZZZZ"), r"ABC \uZZZZ");
    }

    #[test]
    fn control_chars_keep_structure() {
        let s = sanitize_control_chars("Alpha\u{0002}Beta\u{0084}\nLine\tTabbed");
        assert_eq!(s, "AlphaBeta\nLine\tTabbed");
    }
}
