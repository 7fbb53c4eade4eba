use crate::{
    config::Segmenting,
    error::{Error, Result},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MAX_HEADING_CHARS: usize = 100;
// Blank-line detection never scans further back than this.
const MAX_BLANK_LINE_SCAN: usize = 64;
const MAX_SENTENCE_GAP: usize = 8;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:CHAPTER|Chapter|BOOK|Book|PART|Part|SECTION|Section)\s+(?:[IVXLCDM]+|\d+)\b|(?:[IVXLCDM]+|\d+)\.\s+[A-Z]|[A-Z][A-Z ,'-]{10,}$)",
    )
    .unwrap()
});

/// Which kind of boundary closed a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Section,
    Paragraph,
    Sentence,
    Hard,
    /// The segment runs to the end of the document.
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub segment_index: usize,
    pub segment_count: usize,
    /// `[start, end)` in characters; overlap is not included.
    pub char_span: (usize, usize),
    pub boundary: Boundary,
    /// Heading line the span opens with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    target_chars: usize,
    overlap_chars: usize,
    lookback_chars: usize,
}

impl Segmenter {
    pub fn new(target_chars: usize, overlap_chars: usize) -> Result<Self> {
        if target_chars == 0 {
            return Err(Error::config("target_chars must be positive"));
        }
        if overlap_chars >= target_chars {
            return Err(Error::config(format!(
                "overlap_chars ({overlap_chars}) must be smaller than target_chars ({target_chars})"
            )));
        }
        Ok(Self {
            target_chars,
            overlap_chars,
            lookback_chars: (target_chars / 4).max(1),
        })
    }

    pub fn with_lookback(mut self, lookback_chars: usize) -> Result<Self> {
        if lookback_chars == 0 {
            return Err(Error::config("lookback_chars must be positive"));
        }
        self.lookback_chars = lookback_chars.min(self.target_chars);
        Ok(self)
    }

    pub fn from_config(cfg: &Segmenting) -> Result<Self> {
        let s = Self::new(cfg.target_chars, cfg.overlap_chars)?;
        match cfg.lookback_chars {
            Some(n) => s.with_lookback(n),
            None => Ok(s),
        }
    }

    pub fn target_chars(&self) -> usize {
        self.target_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    pub fn lookback_chars(&self) -> usize {
        self.lookback_chars
    }

    pub fn plan<'a>(&self, text: &'a str) -> SegmentPlan<'a> {
        let chars: Vec<char> = text.chars().collect();
        let mut cuts = Vec::new();
        let mut cursor = 0;
        while cursor < chars.len() {
            let (end, boundary) = self.next_cut(&chars, cursor);
            cuts.push(Cut {
                start: cursor,
                end,
                boundary,
            });
            cursor = end;
        }
        debug!(
            "segmented {} chars into {} spans (target={}, overlap={}, lookback={})",
            chars.len(),
            cuts.len(),
            self.target_chars,
            self.overlap_chars,
            self.lookback_chars
        );

        let offsets = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();
        SegmentPlan {
            text,
            chars,
            offsets,
            cuts,
            overlap: self.overlap_chars,
        }
    }

    // Searched backward from the target: section, then paragraph, then sentence.
    fn next_cut(&self, chars: &[char], cursor: usize) -> (usize, Boundary) {
        let hi = cursor + self.target_chars;
        if hi >= chars.len() {
            return (chars.len(), Boundary::End);
        }
        let lo = hi.saturating_sub(self.lookback_chars).max(cursor + 1);

        let tests: [(Boundary, fn(&[char], usize) -> bool); 3] = [
            (Boundary::Section, is_section_start),
            (Boundary::Paragraph, is_paragraph_start),
            (Boundary::Sentence, is_sentence_start),
        ];
        for (kind, test) in tests {
            if let Some(p) = (lo..=hi).rev().find(|&p| test(chars, p)) {
                return (p, kind);
            }
        }
        (hi, Boundary::Hard)
    }
}

/// Splits `text` with the default look-back window.
pub fn segment(text: &str, target_chars: usize, overlap_chars: usize) -> Result<SegmentPlan<'_>> {
    Ok(Segmenter::new(target_chars, overlap_chars)?.plan(text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cut {
    start: usize,
    end: usize,
    boundary: Boundary,
}

#[derive(Debug, Clone)]
pub struct SegmentPlan<'a> {
    text: &'a str,
    chars: Vec<char>,
    // Byte offset of every char index, plus the text length.
    offsets: Vec<usize>,
    cuts: Vec<Cut>,
    overlap: usize,
}

impl<'a> SegmentPlan<'a> {
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn spans(&self) -> Vec<(usize, usize)> {
        self.cuts.iter().map(|c| (c.start, c.end)).collect()
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let count = self.cuts.len();
        self.cuts.iter().enumerate().map(move |(i, cut)| {
            let text_start = match i {
                0 => cut.start,
                _ => cut.start.saturating_sub(self.overlap).max(self.cuts[i - 1].start),
            };
            let title = (cut.start == 0 || self.chars[cut.start - 1] == '\n')
                .then(|| heading_at(&self.chars, cut.start))
                .flatten();
            Segment {
                text: self.text[self.offsets[text_start]..self.offsets[cut.end]].to_string(),
                segment_index: i,
                segment_count: count,
                char_span: (cut.start, cut.end),
                boundary: cut.boundary,
                title,
            }
        })
    }
}

/// The heading line beginning at `p`, if the line there reads as one.
fn heading_at(chars: &[char], p: usize) -> Option<String> {
    let line: String = chars[p..]
        .iter()
        .take(MAX_HEADING_CHARS + 1)
        .take_while(|&&c| c != '\n')
        .collect();
    let line = line.trim();
    if line.len() < 3 || line.chars().count() > MAX_HEADING_CHARS {
        return None;
    }
    HEADING.is_match(line).then(|| line.to_string())
}

fn is_section_start(chars: &[char], p: usize) -> bool {
    p > 0 && chars[p - 1] == '\n' && heading_at(chars, p).is_some()
}

fn is_paragraph_start(chars: &[char], p: usize) -> bool {
    if p < 2 || chars[p - 1] != '\n' || chars[p] == '\n' {
        return false;
    }
    chars[..p - 1]
        .iter()
        .rev()
        .take(MAX_BLANK_LINE_SCAN)
        .find(|c| !matches!(c, ' ' | '\t' | '\r'))
        == Some(&'\n')
}

fn is_sentence_start(chars: &[char], p: usize) -> bool {
    if chars[p].is_whitespace() {
        return false;
    }
    let gap = chars[..p]
        .iter()
        .rev()
        .take(MAX_SENTENCE_GAP)
        .take_while(|c| c.is_whitespace())
        .count();
    if gap == 0 || gap == MAX_SENTENCE_GAP || gap >= p {
        return false;
    }
    let mut k = p - gap - 1;
    if matches!(chars[k], '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}') && k > 0 {
        k -= 1;
    }
    matches!(chars[k], '.' | '!' | '?')
}
