use grokken::pipeline::{Finish, Pipeline};
use grokken::transform::{resolve, Transform, TransformSpec};
use proptest::prelude::*;

fn pipeline(names: &[&str]) -> Pipeline {
    let specs: Vec<TransformSpec> = names.iter().map(|n| TransformSpec::new(*n)).collect();
    Pipeline::from_specs(&specs, Finish::None).expect("valid pipeline")
}

#[test]
fn composition_order_is_preserved() {
    let text = "Ã©clair ï¬\u{81}rst";
    let repair_then_fold = pipeline(&["normalize_to_utf8", "fix_ligatures"]);
    let fold_then_repair = pipeline(&["fix_ligatures", "normalize_to_utf8"]);

    assert_eq!(repair_then_fold.apply(text).unwrap(), "éclair first");
    assert_eq!(fold_then_repair.apply(text).unwrap(), "éclair ﬁrst");
    assert_eq!(
        repair_then_fold.step_names(),
        vec!["normalize_to_utf8", "fix_ligatures"]
    );
}

#[test]
fn labels_allow_a_rule_twice() {
    let specs = vec![
        TransformSpec::new("replace").with("from", "a").with("to", "b"),
        TransformSpec::new("replace")
            .labeled("second_pass")
            .with("from", "b")
            .with("to", "c"),
    ];
    let p = Pipeline::from_specs(&specs, Finish::None).unwrap();
    assert_eq!(p.apply("aab").unwrap(), "ccc");

    let unlabeled = vec![TransformSpec::new("trim"), TransformSpec::new("trim")];
    assert!(Pipeline::from_specs(&unlabeled, Finish::None).is_err());
}

#[test]
fn finishing_step_sees_transformed_text() {
    let finish = Transform::total(TransformSpec::new("count"), |t| format!("{}:{t}", t.len()));
    let specs = vec![TransformSpec::new("trim")];
    let p = Pipeline::from_specs(&specs, Finish::Named(finish)).unwrap();
    assert_eq!(p.apply("  abc  ").unwrap(), "3:abc");
}

#[test]
fn empty_input_stays_empty_through_standard_cleanup() {
    let p = pipeline(&[
        "normalize_to_utf8",
        "fix_ligatures",
        "remove_ocr_artifacts",
        "dehyphenate",
        "normalize_whitespace",
        "trim",
    ]);
    assert_eq!(p.apply("").unwrap(), "");
}

#[test]
fn unknown_rule_is_a_config_error() {
    let err = resolve(&TransformSpec::new("make_it_better")).unwrap_err();
    assert_eq!(err.kind(), "config");
}

proptest! {
    #[test]
    fn apply_is_deterministic(text in "\\PC{0,400}") {
        let p = pipeline(&[
            "normalize_to_utf8",
            "normalize_line_endings",
            "fix_ligatures",
            "normalize_quotes",
            "normalize_dashes",
            "fix_common_errors",
            "remove_ocr_artifacts",
            "dehyphenate",
            "normalize_whitespace",
            "collapse_blank_lines",
            "trim",
        ]);
        let first = p.apply(&text).unwrap();
        let second = p.apply(&text).unwrap();
        prop_assert_eq!(first, second);
    }
}
