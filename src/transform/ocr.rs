use once_cell::sync::Lazy;
use regex::Regex;

fn word_table(pairs: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs
        .iter()
        .map(|(word, fixed)| (Regex::new(&format!(r"\b{word}\b")).unwrap(), *fixed))
        .collect()
}

fn apply_table(text: &str, table: &[(Regex, &'static str)]) -> String {
    let mut out = text.to_string();
    for (re, fixed) in table {
        if re.is_match(&out) {
            out = re.replace_all(&out, *fixed).into_owned();
        }
    }
    out
}

/// `h` read as `b`, `rn` read as `m` in very frequent words.
pub fn fix_common_errors(text: &str) -> String {
    static TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        word_table(&[
            ("tbe", "the"),
            ("Tbe", "The"),
            ("wbich", "which"),
            ("Wbich", "Which"),
            ("tbat", "that"),
            ("Tbat", "That"),
            ("tbis", "this"),
            ("Tbis", "This"),
            ("witb", "with"),
            ("Witb", "With"),
            ("frorn", "from"),
            ("bave", "have"),
        ])
    });
    apply_table(text, &TABLE)
}

/// Only known-safe words; a blanket `rn -> m` would corrupt real words.
pub fn fix_rn_to_m(text: &str) -> String {
    static TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        word_table(&[
            ("govemment", "government"),
            ("Govemment", "Government"),
            ("cornrnon", "common"),
            ("modem", "modern"),
            ("Modem", "Modern"),
            ("sumrner", "summer"),
            ("Surnrner", "Summer"),
        ])
    });
    apply_table(text, &TABLE)
}

pub fn fix_long_s(text: &str) -> String {
    text.replace('ſ', "s")
}

/// `1` between letters becomes `l`, then `0` between lowercase letters becomes `o`.
pub fn fix_digit_letter_confusion(text: &str) -> String {
    let pass = replace_between(text, '1', 'l', |c| c.is_ascii_alphabetic());
    replace_between(&pass, '0', 'o', |c| c.is_ascii_lowercase())
}

fn replace_between(text: &str, from: char, to: char, neighbor: impl Fn(char) -> bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != from || i == 0 {
                return c;
            }
            match (chars.get(i - 1), chars.get(i + 1)) {
                (Some(&prev), Some(&next)) if neighbor(prev) && neighbor(next) => to,
                _ => c,
            }
        })
        .collect()
}

/// Punctuation clusters, lone symbols on their own line, and runs of five or
/// more identical characters (kept as two).
pub fn remove_ocr_artifacts(text: &str) -> String {
    static PUNCT_CLUSTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,;:]{3,}").unwrap());
    static LONE_SYMBOL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^[ \t]*[^\w\s][ \t]*$").unwrap());

    let out = PUNCT_CLUSTER.replace_all(text, "");
    let out = LONE_SYMBOL.replace_all(&out, "");
    collapse_runs(&out, 5, 2)
}

fn collapse_runs(text: &str, threshold: usize, keep: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let emit = if run >= threshold && c != '\n' { keep } else { run };
        out.extend(std::iter::repeat_n(c, emit));
    }
    out
}

/// Broken `ff` read as `tf` in common words.
pub fn fix_ff_ligature(text: &str) -> String {
    static TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
        word_table(&[
            ("ditferent", "different"),
            ("Ditferent", "Different"),
            ("etfect", "effect"),
            ("Etfect", "Effect"),
            ("otfer", "offer"),
            ("Otfer", "Offer"),
            ("sutfer", "suffer"),
            ("Sutfer", "Suffer"),
        ])
    });
    apply_table(text, &TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_errors() {
        assert_eq!(fix_common_errors("tbe quick brown fox"), "the quick brown fox");
        assert_eq!(fix_common_errors("tbesis"), "tbesis");
    }

    #[test]
    fn long_s() {
        assert_eq!(fix_long_s("the firſt ſtep"), "the first step");
    }

    #[test]
    fn digit_letter() {
        assert_eq!(fix_digit_letter_confusion("the peop1e"), "the people");
        assert_eq!(fix_digit_letter_confusion("c0mmon 1890 a0"), "common 1890 a0");
    }

    #[test]
    fn artifacts() {
        assert_eq!(remove_ocr_artifacts("wait......... no"), "wait no");
        assert_eq!(remove_ocr_artifacts("a\n  *  \nb"), "a\n\nb");
        assert_eq!(remove_ocr_artifacts("ooooooh"), "ooh");
    }
}
