use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// `prin-\nciples` becomes `principles`; only when the continuation is lowercase.
pub fn dehyphenate(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-\n\s*([a-z])").unwrap());
    RE.replace_all(text, "${1}${2}").into_owned()
}

/// Also tolerates spaces between the hyphen and the line break.
pub fn dehyphenate_aggressive(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)-[ \t]*\n\s*([a-z])").unwrap());
    RE.replace_all(text, "${1}${2}").into_owned()
}

/// Collapses 3+ newlines into a paragraph break and joins single line breaks
/// inside a paragraph with a space.
pub fn normalize_paragraphs(text: &str) -> String {
    static EXCESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

    let collapsed = EXCESS.replace_all(text, "\n\n");
    let chars: Vec<char> = collapsed.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let inner = c == '\n'
                && i > 0
                && chars.get(i - 1).is_some_and(|&p| p != '\n')
                && chars.get(i + 1).is_some_and(|&n| n != '\n');
            if inner { ' ' } else { c }
        })
        .collect()
}

/// Tabs to spaces, runs of spaces to one, no trailing spaces on lines.
pub fn normalize_whitespace(text: &str) -> String {
    static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
    static TRAILING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m) +$").unwrap());

    let out = text.replace('\t', " ");
    let out = MULTI_SPACE.replace_all(&out, " ");
    TRAILING.replace_all(&out, "").into_owned()
}

pub fn strip_blank_lines(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t\r]*\n").unwrap());
    RE.replace_all(text, "").into_owned()
}

/// Factory: no more than `max_consecutive` line breaks in a row.
pub fn collapse_blank_lines(
    max_consecutive: usize,
) -> Result<impl Fn(&str) -> String + Send + Sync + 'static> {
    if max_consecutive < 1 {
        return Err(Error::config(format!(
            "collapse_blank_lines: max_consecutive must be >= 1, got {max_consecutive}"
        )));
    }
    let re = Regex::new(&format!(r"(?:\n[ \t\r]*){{{},}}", max_consecutive + 1))
        .map_err(|e| Error::config(format!("collapse_blank_lines: {e}")))?;
    let replacement = "\n".repeat(max_consecutive);
    Ok(move |text: &str| re.replace_all(text, replacement.as_str()).into_owned())
}

pub fn trim(text: &str) -> String {
    text.trim().to_string()
}

/// Rejoins hard-wrapped lines. A blank line, or a line shorter than
/// `min_line_length` that does not end in a hyphen, closes the paragraph.
pub fn unwrap_lines(text: &str, min_line_length: usize) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let stripped = line.trim();
        if stripped.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else if stripped.chars().count() < min_line_length && !stripped.ends_with('-') {
            current.push(stripped);
            paragraphs.push(current.join(" "));
            current.clear();
        } else {
            current.push(stripped);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs.join("\n\n")
}
