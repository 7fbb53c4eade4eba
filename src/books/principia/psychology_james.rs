//! William James, "The Principles of Psychology" (1890).

use crate::registry::HandlerDef;
use once_cell::sync::Lazy;
use regex::Regex;

pub fn handler() -> HandlerDef {
    super::def(
        "32044010149714",
        "The Principles of Psychology",
        "James, William",
        "1890",
        "Two-volume work. Headers alternate between the chapter title and \
         \"PRINCIPLES OF PSYCHOLOGY\"; superscript footnotes; occasional \
         untransliterated Greek; figures referenced but absent from the OCR.",
        false,
        "psychology_james_cleanup",
    )
}

const FRONT_MARKER: &str = "PSYCHOLOGY.\nCHAPTER XVII.";

/// Trims front and back matter, strips the running headers in their five
/// page-number arrangements, then reflows lines broken mid-sentence.
pub fn finish(text: &str) -> String {
    static BACK_MATTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"THE END\.[ \t]*\n").unwrap());
    static HEADERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        [
            (r"\n\d{1,4}\nPSYCHOLOG ?Y\.\n", "\n"),
            (r"\n\d{1,4}\n[A-Z][A-Z ]{2,50}\.\n", "\n"),
            (r"\n[A-Z][A-Z -]{2,50}\.\n\d{1,4}\n", "\n"),
            (r"(?m)^[ \t]*\d+[ \t]+(?:PRINCIPLES OF PSYCHOLOGY|[A-Z][A-Z ]+)[ \t]*$", ""),
            (r"(?m)^[A-Z][A-Z -]+\.?[ \t]+\d+[ \t]*$", ""),
            (r"\n{3,}", "\n\n"),
            (r"([a-z,;:])\n([a-z])", "${1} ${2}"),
            (r#"([a-z]['")])\n([a-z])"#, "${1} ${2}"),
        ]
        .into_iter()
        .map(|(p, r)| (Regex::new(p).unwrap(), r))
        .collect()
    });

    let mut out = match text.find(FRONT_MARKER) {
        Some(pos) if pos > 0 => text[pos + "PSYCHOLOGY.\n".len()..].to_string(),
        _ => text.to_string(),
    };
    if let Some(m) = BACK_MATTER.find(&out) {
        out.truncate(m.end());
    }
    for (re, replacement) in HEADERS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_matter_and_headers() {
        let text = "LIBRARY STAMP\nPSYCHOLOGY.\nCHAPTER XVII.\nsensation is\nthe first\n322\nPSYCHOLOGY.\nthing.\nTHE END.\nINDEX";
        assert_eq!(finish(text), "CHAPTER XVII.\nsensation is the first thing.\nTHE END.\n");
    }
}
