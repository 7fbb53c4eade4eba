//! John Stuart Mill, "Principles of Political Economy" (1884 edition).

use crate::registry::HandlerDef;
use once_cell::sync::Lazy;
use regex::Regex;

pub fn handler() -> HandlerDef {
    super::def(
        "LI3QQB",
        "Principles of Political Economy",
        "Mill, John Stuart",
        "1884",
        "Dense argumentative prose. Running headers carry Book/Chapter/section \
         markers (BOOK IV. CHAPTER IV. §3.); footnotes with references.",
        false,
        "political_economy_mill_cleanup",
    )
}

pub fn finish(text: &str) -> String {
    static RUNNING_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*BOOK\s+[IVXLC]+\.\s+CHAPTER\s+[IVXLC]+\.\s*§?\d*\.?[ \t]*$").unwrap()
    });
    static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d{1,4}[ \t]*$").unwrap());
    static LONE_CAPITAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[A-Z][ \t]*$").unwrap());

    let out = RUNNING_HEADER.replace_all(text, "");
    let out = PAGE_NUMBER.replace_all(&out, "");
    LONE_CAPITAL.replace_all(&out, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_book_chapter_headers() {
        let out = finish("value.\nBOOK IV. CHAPTER IV. §3.\nprofits\nQ\n212");
        assert_eq!(out, "value.\n\nprofits\n\n");
    }
}
