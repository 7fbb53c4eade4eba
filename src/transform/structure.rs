use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Factory: removes every match of `pattern`, compiled in multi-line mode so
/// `^`/`$` anchor on lines.
pub fn remove_page_headers(pattern: &str) -> Result<impl Fn(&str) -> String + Send + Sync + 'static> {
    let re = Regex::new(&format!("(?m){pattern}")).map_err(|e| {
        Error::config(format!("remove_page_headers: invalid pattern `{pattern}`: {e}"))
    })?;
    Ok(move |text: &str| re.replace_all(text, "").into_owned())
}

/// Decorated (`— 42 —`) and bracketed (`[42]`) page numbers only. Bare numbers
/// on their own line may be years or verse numbers and are left alone.
pub fn remove_page_numbers(text: &str) -> String {
    static DECORATED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^[ \t]*[—–-][ \t]*\d+[ \t]*[—–-][ \t]*$").unwrap());
    static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\[\d+\][ \t]*$").unwrap());

    let out = DECORATED.replace_all(text, "");
    BRACKETED.replace_all(&out, "").into_owned()
}

/// Drops short lines that repeat at least `min_occurrences` times
/// (case-insensitive). Blank lines are always kept.
pub fn remove_running_headers(text: &str, min_occurrences: usize, max_length: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let key = |l: &str| l.trim().to_uppercase();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for &l in &lines {
        let k = key(l);
        if k.is_empty() || k.chars().count() >= max_length {
            continue;
        }
        *counts.entry(k).or_insert(0) += 1;
    }

    lines
        .into_iter()
        .filter(|&l| counts.get(&key(l)).copied().unwrap_or(0) < min_occurrences)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn remove_footnote_markers(text: &str) -> String {
    static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]|\(\d+\)").unwrap());
    static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[⁰¹²³⁴⁵⁶⁷⁸⁹]+").unwrap());
    static SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*†‡§‖¶]+(\s|$)").unwrap());

    let out = NUMERIC.replace_all(text, "");
    let out = SUPERSCRIPT.replace_all(&out, "");
    SYMBOL.replace_all(&out, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_headers() {
        let strip = remove_page_headers(r"^CHAPTER ONE$").unwrap();
        let out = strip("CHAPTER ONE\n\nContent here\n\nCHAPTER ONE\n\nMore content");
        assert!(!out.contains("CHAPTER ONE"));
        assert!(out.contains("Content here"));
    }

    #[test]
    fn page_numbers() {
        let out = remove_page_numbers("Content\n\n— 42 —\n\nMore content\n\n[123]\n\nEnd\n\n1864");
        assert!(!out.contains("42"));
        assert!(!out.contains("123"));
        assert!(out.contains("1864"));
    }

    #[test]
    fn running_headers() {
        let mut text = String::new();
        for i in 0..4 {
            text.push_str(&format!("The Federalist.\nbody {i}\n"));
        }
        let out = remove_running_headers(&text, 3, 100);
        assert!(!out.contains("Federalist"));
        assert!(out.contains("body 3"));
    }

    #[test]
    fn footnote_markers() {
        assert_eq!(remove_footnote_markers("word[1] and² this* end†"), "word and this end");
    }
}
