//! "The Federalist" (1864 reprint of the 1788 essays by Hamilton, Madison and Jay).

use crate::registry::HandlerDef;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub fn handler() -> HandlerDef {
    super::def(
        "32044072043805",
        "The Federalist: a collection of essays in favor of the new Constitution",
        "Hamilton, Madison, Jay",
        "1864",
        "Running headers \"The Federalist.\" in four page-number arrangements; \
         VOL. I. section markers; roman and letter page ids in the introduction; \
         Greek and Cyrillic homoglyphs from the OCR engine.",
        true,
        "federalist_cleanup",
    )
}

fn regexes(patterns: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    patterns
        .iter()
        .map(|(p, r)| (Regex::new(p).unwrap(), *r))
        .collect()
}

const HOMOGLYPHS: &[(&str, &str)] = &[
    ("Jáy", "Jay"),
    ("\u{275d}", "\""),
    ("\u{275e}", "\""),
    ("\u{3a4}\u{39f}", "TO"),
    ("\u{3a4}\u{3bf}", "To"),
    ("\u{410}", "A"),
    ("\u{43c}", "m"),
    ("RomULUS", "ROMULUS"),
    ("\u{1ecb}", "i"),
    ("\u{2758}", "|"),
    ("\u{b7}", "."),
];

pub fn finish(text: &str) -> String {
    static FRONT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^INTRODUCTION\.[ \t]*$").unwrap());
    static BACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"END OF VOL\.\s*I\.[ \t]*\n").unwrap());
    static VOL_MARKER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(END OF )?VOL\.[ \t]*I\.[ \t]*\n").unwrap());
    static OCR: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        regexes(&[
            ("\u{152}([A-Z])", "OE${1}"),
            ("\u{152}", "Oe"),
            ("\u{153}", "oe"),
            (r"THOm-?\n?AS\b", "THOMAS"),
            (
                r"[\x{370}-\x{3ff}\x{400}-\x{4ff}\x{600}-\x{6ff}\x{e00}-\x{e7f}\x{f00}-\x{fff}\x{4e00}-\x{9fff}\x{ac00}-\x{d7af}\x{3130}-\x{318f}]",
                "",
            ),
            ("\n([A-Z])[\u{2070}\u{b9}\u{b2}\u{b3}\u{2074}-\u{2079}]+\n([A-Z]{2,})", "\n${1}${2}"),
            ("[\u{2070}\u{b9}\u{b2}\u{b3}\u{2074}-\u{2079}]", ""),
            ("[\u{2022}\u{26ab}\u{25bc}\u{bf}]", ""),
            ("\u{2026}+", "..."),
            (r"\.{4,}", "..."),
        ])
    });
    static HEADERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        let header = r"(?:The\s+F[oe]{0,2}deralist|Introduction|Contents|Advertisement)\.";
        let owned = [
            (format!(r"\n[+*]?\d{{1,4}}\n{header}\n"), "\n"),
            (format!(r"\n{header}\n\d{{1,4}}\n"), "\n"),
            (format!(r"(?m)^[ \t]*\d+[ \t]+{header}[ \t]*$"), ""),
            (format!(r"(?m)^[ \t]*{header}[ \t]+\d+[ \t]*$"), ""),
        ];
        owned
            .iter()
            .map(|(p, r)| (Regex::new(p).unwrap(), *r))
            .collect()
    });
    static LINES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        regexes(&[
            (r"(?m)^[ \t]*THE\s+FEDERALIST\.?[ \t]*$", ""),
            (r"(?m)^[ \t]*(?:Introduction|Contents|Advertisement)\.[ \t]*$", ""),
            (r"(?m)^[ \t]*\d{1,4}[ \t]*$", ""),
            (r"(?m)^[ \t]*[a-h][ \t]*$", ""),
            (r"(?m)^[ \t]*(?:[ivxlc]{2,6}|[IVXLC]{2,6})[ \t]*$", ""),
            (r"\n{3,}", "\n\n"),
            (r"(\w)-\n\n([a-z])", "${1}${2}"),
            (r"(\w)- +\n([a-z])", "${1}${2}"),
            (r"([a-z,;:])\n([a-z])", "${1} ${2}"),
            (r"([a-z]\.)\n([a-z])", "${1} ${2}"),
            (r#"([a-z]['")])\n([a-z])"#, "${1} ${2}"),
        ])
    });

    let mut out = match FRONT.find(text) {
        Some(m) => text[m.start()..].to_string(),
        None => text.to_string(),
    };
    if let Some(m) = BACK.find(&out) {
        out.truncate(m.end());
    }
    for (from, to) in HOMOGLYPHS {
        out = out.replace(from, to);
    }
    for (re, replacement) in OCR.iter().chain(HEADERS.iter()) {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    // "END OF VOL. I." closes the book and must survive.
    out = VOL_MARKER
        .replace_all(&out, |caps: &Captures| match caps.get(1) {
            Some(_) => caps[0].to_string(),
            None => "\n".to_string(),
        })
        .into_owned();
    for (re, replacement) in LINES.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_front_matter_and_running_headers() {
        let text = "LIBRARY STAMP\nINTRODUCTION.\nThe essays of Jáy were\nwidely read.\n43\nThe Federalist.\nVOL. I.\nMore text.\nEND OF VOL. I.\nstamp";
        assert_eq!(
            finish(text),
            "INTRODUCTION.\nThe essays of Jay were widely read.\n\nMore text.\nEND OF VOL. I.\n"
        );
    }
}
