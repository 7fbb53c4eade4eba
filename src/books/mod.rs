pub mod principia;

use crate::{
    error::Result,
    registry::{DescriptorSource, Discovered},
    transform::{Transform, TransformSpec},
};

pub type FinishFn = fn(&str) -> String;

pub const FINISHERS: &[(&str, FinishFn)] = &[
    ("federalist_cleanup", principia::federalist::finish),
    ("psychology_james_cleanup", principia::psychology_james::finish),
    ("algebra_day_cleanup", principia::algebra_day::finish),
    ("political_economy_mill_cleanup", principia::political_economy_mill::finish),
];

/// Looks up a finishing function by name.
pub fn finisher(name: &str) -> Option<Transform> {
    FINISHERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(n, f)| Transform::total(TransformSpec::new(n), f))
}

pub struct BuiltinCatalog;

impl DescriptorSource for BuiltinCatalog {
    fn origin(&self) -> String {
        "builtin".to_string()
    }

    fn scan(&self) -> Result<Discovered> {
        Ok(Discovered {
            collections: vec![principia::COLLECTION.to_string()],
            defs: principia::HANDLERS.iter().map(|h| h()).collect(),
        })
    }
}

/// The cleanup sequence shared by most scanned books: encoding, typography,
/// OCR fixes, then whitespace.
pub(crate) fn standard_transforms(pre_1800_typeface: bool) -> Vec<TransformSpec> {
    let mut specs = vec![
        TransformSpec::new("normalize_to_utf8"),
        TransformSpec::new("normalize_line_endings"),
        TransformSpec::new("fix_ligatures"),
        TransformSpec::new("normalize_quotes"),
        TransformSpec::new("normalize_dashes"),
        TransformSpec::new("normalize_spaces"),
        TransformSpec::new("fix_common_errors"),
    ];
    if pre_1800_typeface {
        specs.push(TransformSpec::new("fix_long_s"));
    }
    specs.extend([
        TransformSpec::new("fix_digit_letter_confusion"),
        TransformSpec::new("remove_ocr_artifacts"),
        TransformSpec::new("dehyphenate"),
        TransformSpec::new("normalize_whitespace"),
        TransformSpec::new("collapse_blank_lines").with("max_consecutive", 2),
        TransformSpec::new("trim"),
    ]);
    specs
}
