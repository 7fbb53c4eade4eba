use once_cell::sync::Lazy;
use regex::Regex;

const LIGATURES: &[(char, &str)] = &[
    ('ﬀ', "ff"),
    ('ﬁ', "fi"),
    ('ﬂ', "fl"),
    ('ﬃ', "ffi"),
    ('ﬄ', "ffl"),
    ('ﬅ', "st"),
    ('ﬆ', "st"),
    ('Ꜳ', "AA"),
    ('ꜳ', "aa"),
    ('Æ', "AE"),
    ('æ', "ae"),
    ('Œ', "OE"),
    ('œ', "oe"),
    ('ꝏ', "oo"),
    ('ẞ', "SS"),
    ('ß', "ss"),
];

pub fn fix_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}

pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' | '«' | '»' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' => '\'',
            other => other,
        })
        .collect()
}

/// `---` to em dash, `--` to en dash, and odd Unicode dashes to their usual forms.
pub fn normalize_dashes(text: &str) -> String {
    static TRIPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}").unwrap());

    let out = TRIPLE.replace_all(text, "—");
    out.replace("--", "–")
        .chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' => '-',
            '\u{2012}' => '–',
            '\u{2015}' => '—',
            other => other,
        })
        .collect()
}

pub fn normalize_dashes_to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '–' | '—' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2015}' => '-',
            other => other,
        })
        .collect()
}

pub fn normalize_ellipsis(text: &str) -> String {
    static DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").unwrap());
    DOTS.replace_all(text, "...").into_owned()
}

pub fn normalize_spaces(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{2002}'..='\u{200b}' | '\u{202f}' | '\u{205f}' | '\u{3000}' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligatures() {
        assert_eq!(fix_ligatures("ﬁnding the ﬂoor"), "finding the floor");
    }

    #[test]
    fn quotes() {
        let text = "\u{201c}Hello,\u{201d} she said, \u{2018}quietly\u{2019}";
        assert_eq!(normalize_quotes(text), "\"Hello,\" she said, 'quietly'");
    }

    #[test]
    fn dashes() {
        assert_eq!(normalize_dashes("word---word and word--word"), "word—word and word–word");
    }

    #[test]
    fn spaces() {
        assert_eq!(normalize_spaces("a\u{2009}b\u{3000}c"), "a b c");
    }
}
