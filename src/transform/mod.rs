pub mod encoding;
pub mod ocr;
pub mod structure;
pub mod typography;
pub mod whitespace;

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Raised by a rule that refuses its input.
#[derive(Debug, Clone, ThisError)]
#[error("{0}")]
pub struct RuleError(pub String);

pub type RuleFn = dyn Fn(&str) -> std::result::Result<String, RuleError> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecRepr", into = "SpecRepr")]
pub struct TransformSpec {
    pub name: String,
    /// Overrides `name` as the step's identity inside a pipeline.
    pub label: Option<String>,
    pub params: BTreeMap<String, serde_json::Value>,
}

// Accepts either `"trim"` or `{ name = "collapse_blank_lines", max_consecutive = 2 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SpecRepr {
    Name(String),
    Table {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(flatten)]
        params: BTreeMap<String, serde_json::Value>,
    },
}

impl From<SpecRepr> for TransformSpec {
    fn from(repr: SpecRepr) -> Self {
        match repr {
            SpecRepr::Name(name) => TransformSpec::new(name),
            SpecRepr::Table {
                name,
                label,
                params,
            } => TransformSpec {
                name,
                label,
                params,
            },
        }
    }
}

impl From<TransformSpec> for SpecRepr {
    fn from(spec: TransformSpec) -> Self {
        if spec.label.is_none() && spec.params.is_empty() {
            SpecRepr::Name(spec.name)
        } else {
            SpecRepr::Table {
                name: spec.name,
                label: spec.label,
                params: spec.params,
            }
        }
    }
}

impl TransformSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Identity of the step inside a pipeline.
    pub fn step_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    fn str_param(&self, key: &str) -> Result<&str> {
        match self.params.get(key) {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(other) => Err(Error::config(format!(
                "transform {}: parameter `{key}` must be a string, got {other}",
                self.name
            ))),
            None => Err(Error::config(format!(
                "transform {}: missing required parameter `{key}`",
                self.name
            ))),
        }
    }

    fn usize_param_or(&self, key: &str, default: usize) -> Result<usize> {
        match self.params.get(key) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    Error::config(format!(
                        "transform {}: parameter `{key}` must be a non-negative integer, got {v}",
                        self.name
                    ))
                }),
        }
    }

    fn regex_param(&self, key: &str) -> Result<Regex> {
        let pattern = self.str_param(key)?;
        Regex::new(pattern).map_err(|e| {
            Error::config(format!(
                "transform {}: invalid pattern `{pattern}`: {e}",
                self.name
            ))
        })
    }
}

/// A resolved rewrite rule: `text -> text`.
#[derive(Clone)]
pub struct Transform {
    spec: TransformSpec,
    func: Arc<RuleFn>,
}

impl Transform {
    /// Wraps a rule that cannot fail.
    pub fn total<F>(spec: TransformSpec, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            spec,
            func: Arc::new(move |text: &str| Ok(f(text))),
        }
    }

    pub fn fallible<F>(spec: TransformSpec, f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, RuleError> + Send + Sync + 'static,
    {
        Self {
            spec,
            func: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        self.spec.step_name()
    }

    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    pub fn apply(&self, text: &str) -> std::result::Result<String, RuleError> {
        (self.func)(text)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name())
            .field("params", &self.spec.params)
            .finish()
    }
}

/// Every rule name [`resolve`] understands.
pub const CATALOG: &[&str] = &[
    "normalize_to_utf8",
    "strip_null_bytes",
    "normalize_line_endings",
    "fix_unicode_escapes",
    "normalize_unicode",
    "sanitize_control_chars",
    "fix_common_errors",
    "fix_rn_to_m",
    "fix_long_s",
    "fix_digit_letter_confusion",
    "remove_ocr_artifacts",
    "fix_ff_ligature",
    "fix_ligatures",
    "normalize_quotes",
    "normalize_dashes",
    "normalize_dashes_to_ascii",
    "normalize_ellipsis",
    "normalize_spaces",
    "remove_page_headers",
    "remove_page_numbers",
    "remove_running_headers",
    "remove_footnote_markers",
    "dehyphenate",
    "dehyphenate_aggressive",
    "normalize_paragraphs",
    "normalize_whitespace",
    "strip_blank_lines",
    "collapse_blank_lines",
    "trim",
    "unwrap_lines",
    "replace",
    "regex_replace",
    "reject_matching",
];

/// Builds the callable for `spec`. Unknown rules and bad parameters are
/// configuration errors.
pub fn resolve(spec: &TransformSpec) -> Result<Transform> {
    let s = spec.clone();
    let t = match spec.name.as_str() {
        "normalize_to_utf8" => Transform::total(s, encoding::normalize_to_utf8),
        "strip_null_bytes" => Transform::total(s, encoding::strip_null_bytes),
        "normalize_line_endings" => Transform::total(s, encoding::normalize_line_endings),
        "fix_unicode_escapes" => Transform::total(s, encoding::fix_unicode_escapes),
        "normalize_unicode" => {
            let form = match spec.params.get("form") {
                None => encoding::UnicodeForm::Nfc,
                Some(_) => encoding::UnicodeForm::parse(spec.str_param("form")?)?,
            };
            Transform::total(s, move |text| encoding::normalize_unicode(text, form))
        }
        "sanitize_control_chars" => Transform::total(s, encoding::sanitize_control_chars),
        "fix_common_errors" => Transform::total(s, ocr::fix_common_errors),
        "fix_rn_to_m" => Transform::total(s, ocr::fix_rn_to_m),
        "fix_long_s" => Transform::total(s, ocr::fix_long_s),
        "fix_digit_letter_confusion" => Transform::total(s, ocr::fix_digit_letter_confusion),
        "remove_ocr_artifacts" => Transform::total(s, ocr::remove_ocr_artifacts),
        "fix_ff_ligature" => Transform::total(s, ocr::fix_ff_ligature),
        "fix_ligatures" => Transform::total(s, typography::fix_ligatures),
        "normalize_quotes" => Transform::total(s, typography::normalize_quotes),
        "normalize_dashes" => Transform::total(s, typography::normalize_dashes),
        "normalize_dashes_to_ascii" => Transform::total(s, typography::normalize_dashes_to_ascii),
        "normalize_ellipsis" => Transform::total(s, typography::normalize_ellipsis),
        "normalize_spaces" => Transform::total(s, typography::normalize_spaces),
        "remove_page_headers" => {
            let strip = structure::remove_page_headers(spec.str_param("pattern")?)?;
            Transform::total(s, strip)
        }
        "remove_page_numbers" => Transform::total(s, structure::remove_page_numbers),
        "remove_running_headers" => {
            let min = spec.usize_param_or("min_occurrences", 10)?;
            let max_len = spec.usize_param_or("max_length", 100)?;
            if min < 2 {
                return Err(Error::config(format!(
                    "transform {}: min_occurrences must be >= 2, got {min}",
                    spec.name
                )));
            }
            Transform::total(s, move |text| {
                structure::remove_running_headers(text, min, max_len)
            })
        }
        "remove_footnote_markers" => Transform::total(s, structure::remove_footnote_markers),
        "dehyphenate" => Transform::total(s, whitespace::dehyphenate),
        "dehyphenate_aggressive" => Transform::total(s, whitespace::dehyphenate_aggressive),
        "normalize_paragraphs" => Transform::total(s, whitespace::normalize_paragraphs),
        "normalize_whitespace" => Transform::total(s, whitespace::normalize_whitespace),
        "strip_blank_lines" => Transform::total(s, whitespace::strip_blank_lines),
        "collapse_blank_lines" => {
            let max = spec.usize_param_or("max_consecutive", 2)?;
            Transform::total(s, whitespace::collapse_blank_lines(max)?)
        }
        "trim" => Transform::total(s, whitespace::trim),
        "unwrap_lines" => {
            let min = spec.usize_param_or("min_line_length", 60)?;
            Transform::total(s, move |text| whitespace::unwrap_lines(text, min))
        }
        "replace" => {
            let from = spec.str_param("from")?.to_string();
            let to = spec.str_param("to")?.to_string();
            if from.is_empty() {
                return Err(Error::config("transform replace: `from` must not be empty"));
            }
            Transform::total(s, move |text| text.replace(&from, &to))
        }
        "regex_replace" => {
            let re = spec.regex_param("pattern")?;
            let replacement = spec.str_param("replacement")?.to_string();
            Transform::total(s, move |text| {
                re.replace_all(text, replacement.as_str()).into_owned()
            })
        }
        "reject_matching" => {
            let re = spec.regex_param("pattern")?;
            Transform::fallible(s, move |text| match re.find(text) {
                Some(m) => Err(RuleError(format!(
                    "forbidden pattern `{}` still present at byte {}",
                    re.as_str(),
                    m.start()
                ))),
                None => Ok(text.to_string()),
            })
        }
        other => {
            return Err(Error::config(format!("unknown transform: {other}")));
        }
    };
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_parses_bare_names_and_tables() {
        #[derive(Deserialize)]
        struct Wrap {
            transforms: Vec<TransformSpec>,
        }
        let raw = r#"
            transforms = [
                "trim",
                { name = "collapse_blank_lines", max_consecutive = 3 },
                { name = "remove_page_headers", label = "drop_vol", pattern = "^VOL\\. I\\.$" },
            ]
        "#;
        let w: Wrap = toml::from_str(raw).unwrap();
        assert_eq!(w.transforms[0], TransformSpec::new("trim"));
        assert_eq!(w.transforms[1].params["max_consecutive"], 3);
        assert_eq!(w.transforms[2].step_name(), "drop_vol");
    }

    #[test]
    fn factories_validate_parameters() {
        assert!(resolve(&TransformSpec::new("collapse_blank_lines").with("max_consecutive", 0)).is_err());
        assert!(resolve(&TransformSpec::new("remove_page_headers")).is_err());
        assert!(resolve(&TransformSpec::new("remove_page_headers").with("pattern", "(")).is_err());
        assert!(resolve(&TransformSpec::new("no_such_rule")).is_err());
    }

    #[test]
    fn every_catalog_entry_is_total_on_empty_input() {
        for name in CATALOG {
            let spec = match *name {
                "remove_page_headers" | "regex_replace" | "reject_matching" => {
                    TransformSpec::new(*name).with("pattern", "XYZ").with("replacement", "")
                }
                "replace" => TransformSpec::new(*name).with("from", "a").with("to", "b"),
                _ => TransformSpec::new(*name),
            };
            let t = resolve(&spec).unwrap();
            assert_eq!(t.apply("").unwrap(), "", "{name}");
            t.apply("   \n\n  \t").unwrap();
        }
    }

    #[test]
    fn reject_matching_fails_with_reason() {
        let t = resolve(&TransformSpec::new("reject_matching").with("pattern", "Ã")).unwrap();
        assert!(t.apply("clean").is_ok());
        let err = t.apply("Ã©clair").unwrap_err();
        assert!(err.0.contains("byte 0"));
    }
}
