use grokken::segment::{segment, Boundary, Segment, Segmenter};
use proptest::prelude::*;

fn collect(seg: &Segmenter, text: &str) -> Vec<Segment> {
    seg.plan(text).segments().collect()
}

#[test]
fn prefers_paragraph_break_over_hard_cut() {
    let first = "alpha beta gamma delta ".repeat(4);
    let first = first.trim_end();
    let second = "lorem ipsum dolor sit amet ".repeat(10);
    let text = format!("{first}\n\n{second}");
    let para_start = first.chars().count() + 2;

    let seg = Segmenter::new(100, 10).unwrap();
    let segs = collect(&seg, &text);
    assert_eq!(segs[0].char_span, (0, para_start));
    assert_eq!(segs[0].boundary, Boundary::Paragraph);
}

#[test]
fn section_heading_outranks_paragraph() {
    let body = "some words here ".repeat(3);
    let text = format!(
        "{body}\n\nCHAPTER II.\n\n{body}\n\nmore{}",
        " filler".repeat(30)
    );
    let heading = text.find("CHAPTER II.").unwrap();
    let seg = Segmenter::new(110, 0).unwrap().with_lookback(110).unwrap();
    let segs = collect(&seg, &text);
    assert_eq!(segs[0].char_span.1, heading);
    assert_eq!(segs[0].boundary, Boundary::Section);
    assert_eq!(segs[1].title.as_deref(), Some("CHAPTER II."));
}

#[test]
fn sentence_end_when_no_paragraph_break() {
    let text = format!("{}. Then {}", "a".repeat(90), "b ".repeat(60));
    let segs = collect(&Segmenter::new(100, 0).unwrap(), &text);
    assert_eq!(segs[0].char_span, (0, 92));
    assert_eq!(segs[0].boundary, Boundary::Sentence);
}

#[test]
fn hard_cut_without_any_boundary() {
    let text = "x".repeat(250);
    let segs = collect(&Segmenter::new(100, 20).unwrap(), &text);
    let spans: Vec<(usize, usize)> = segs.iter().map(|s| s.char_span).collect();
    assert_eq!(spans, vec![(0, 100), (100, 200), (200, 250)]);
    assert_eq!(segs[1].text.chars().count(), 120);
    assert_eq!(segs[2].boundary, Boundary::End);
    assert!(segs.iter().all(|s| s.segment_count == 3));
}

#[test]
fn empty_text_yields_nothing() {
    assert!(segment("", 10, 2).unwrap().is_empty());
}

#[test]
fn invalid_sizes_are_config_errors() {
    assert_eq!(Segmenter::new(0, 0).unwrap_err().kind(), "config");
    assert_eq!(Segmenter::new(10, 10).unwrap_err().kind(), "config");
    assert_eq!(
        Segmenter::new(10, 2).unwrap().with_lookback(0).unwrap_err().kind(),
        "config"
    );
}

#[test]
fn records_serialize_with_span_pairs() {
    let plan = segment("one two", 100, 5).unwrap();
    let v = serde_json::to_value(plan.segments().next().unwrap()).unwrap();
    assert_eq!(v["char_span"], serde_json::json!([0, 7]));
    assert_eq!(v["boundary"], "end");
    assert_eq!(v["segment_count"], 1);
}

proptest! {
    #[test]
    fn spans_partition_the_text(
        text in "[a-zé .!?\n]{0,600}",
        target in 1usize..120,
        overlap_seed in 0usize..120,
    ) {
        let overlap = overlap_seed % target;
        let seg = Segmenter::new(target, overlap).unwrap();
        let chars: Vec<char> = text.chars().collect();
        let segs = collect(&seg, &text);

        let mut cursor = 0;
        let mut prev_start = 0;
        for (i, s) in segs.iter().enumerate() {
            let (start, end) = s.char_span;
            prop_assert_eq!(start, cursor);
            prop_assert!(end > start);
            prop_assert!(end - start <= target);
            prop_assert_eq!(s.segment_index, i);
            prop_assert_eq!(s.segment_count, segs.len());

            let text_len = s.text.chars().count();
            let text_start = end - text_len;
            prop_assert!(text_start <= start);
            prop_assert!(start - text_start <= overlap);
            if i > 0 {
                prop_assert!(text_start >= prev_start);
            }
            let expected: String = chars[text_start..end].iter().collect();
            prop_assert_eq!(&s.text, &expected);

            prev_start = start;
            cursor = end;
        }
        prop_assert_eq!(cursor, chars.len());
    }
}
