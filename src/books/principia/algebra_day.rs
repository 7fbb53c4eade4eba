//! Jeremiah Day, "An Introduction to Algebra" (1847).

use crate::registry::HandlerDef;
use once_cell::sync::Lazy;
use regex::Regex;

pub fn handler() -> HandlerDef {
    super::def(
        "32044097009690",
        "An Introduction to Algebra",
        "Day, Jeremiah",
        "1847",
        "Mathematics textbook. Running headers like \"EQUATIONS\"; variables \
         (x, l, 0, o) confuse OCR; problem numbers (Prob. 26).",
        true,
        "algebra_day_cleanup",
    )
}

pub fn finish(text: &str) -> String {
    static HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*(?:\d+[ \t]+EQUATIONS\.?|EQUATIONS\.?[ \t]+\d+)[ \t]*$").unwrap()
    });
    static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d{1,4}[ \t]*$").unwrap());

    let out = HEADER.replace_all(text, "");
    PAGE_NUMBER.replace_all(&out, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_equation_headers_and_page_numbers() {
        let out = finish("x = 2\n112 EQUATIONS.\ny = 3\nEQUATIONS 113\n114\nz");
        assert_eq!(out, "x = 2\n\ny = 3\n\n\nz");
    }
}
