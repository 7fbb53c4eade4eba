use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: ChunkSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSource {
    pub identifier: String,
    pub chunk_index: usize,
    pub chunk_count: usize,
    /// Character offsets of `text` in the cleaned document.
    pub char_start: usize,
    pub char_end: usize,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A contiguous piece of the document, in both byte and character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub byte_start: usize,
    pub byte_end: usize,
    pub char_start: usize,
    pub char_end: usize,
}

impl TextSpan {
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

#[derive(Debug, Clone)]
pub struct ChunkPlan<'a> {
    text: &'a str,
    identifier: String,
    metadata: BTreeMap<String, serde_json::Value>,
    spans: Vec<TextSpan>,
}

/// Whitespace-only text yields no chunks. A paragraph longer than `max_chars`
/// is emitted alone rather than split mid-sentence, so that chunk may exceed
/// the budget.
pub fn chunk<'a>(text: &'a str, identifier: &str, max_chars: usize) -> Result<ChunkPlan<'a>> {
    if max_chars == 0 {
        return Err(Error::config("max_chars must be positive"));
    }

    let total = text.chars().count();
    let spans = if text.trim().is_empty() {
        Vec::new()
    } else if total <= max_chars {
        vec![TextSpan {
            byte_start: 0,
            byte_end: text.len(),
            char_start: 0,
            char_end: total,
        }]
    } else {
        pack(&paragraphs(text), max_chars)
    };

    debug!("{identifier}: {} chars -> {} chunks (max_chars={max_chars})", total, spans.len());
    Ok(ChunkPlan {
        text,
        identifier: identifier.to_string(),
        metadata: BTreeMap::new(),
        spans,
    })
}

impl<'a> ChunkPlan<'a> {
    /// Provenance copied into every chunk's `source`.
    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        let count = self.spans.len();
        self.spans.iter().enumerate().map(move |(i, span)| Chunk {
            text: self.text[span.byte_start..span.byte_end].to_string(),
            source: ChunkSource {
                identifier: self.identifier.clone(),
                chunk_index: i,
                chunk_count: count,
                char_start: span.char_start,
                char_end: span.char_end,
                metadata: self.metadata.clone(),
            },
        })
    }
}

/// Paragraphs are separated by one or more blank lines. The separators and
/// whitespace-only pieces are dropped.
pub fn paragraphs(text: &str) -> Vec<TextSpan> {
    static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t\r]*\n)+").unwrap());

    let mut counter = CharCounter::new(text);
    let mut out = Vec::new();
    let mut push = |start: usize, end: usize, counter: &mut CharCounter| {
        if text[start..end].trim().is_empty() {
            return;
        }
        let char_start = counter.at(start);
        let char_end = counter.at(end);
        out.push(TextSpan {
            byte_start: start,
            byte_end: end,
            char_start,
            char_end,
        });
    };

    let mut last = 0;
    for m in SEPARATOR.find_iter(text) {
        push(last, m.start(), &mut counter);
        last = m.end();
    }
    push(last, text.len(), &mut counter);
    out
}

fn pack(paras: &[TextSpan], max_chars: usize) -> Vec<TextSpan> {
    let mut out = Vec::new();
    let Some((first, rest)) = paras.split_first() else {
        return out;
    };
    let mut current = *first;
    for p in rest {
        if p.char_end - current.char_start > max_chars {
            out.push(current);
            current = *p;
        } else {
            current.byte_end = p.byte_end;
            current.char_end = p.char_end;
        }
    }
    out.push(current);
    out
}

/// Converts increasing byte offsets to character offsets in one forward pass.
struct CharCounter<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn at(&mut self, byte: usize) -> usize {
        if byte >= self.byte {
            self.chars += self.text[self.byte..byte].chars().count();
        } else {
            self.chars -= self.text[byte..self.byte].chars().count();
        }
        self.byte = byte;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_offsets_are_in_chars() {
        let spans = paragraphs("é one\n\n  \nœ two");
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].char_start, spans[0].char_end), (0, 5));
        assert_eq!((spans[1].char_start, spans[1].char_end), (10, 15));
    }

    #[test]
    fn packs_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let plan = chunk(text, "X", 10).unwrap();
        let texts: Vec<String> = plan.chunks().map(|c| c.text).collect();
        assert_eq!(texts, vec!["aaaa\n\nbbbb", "cccc"]);
    }
}
