use crate::{
    error::{Error, Result},
    transform::{self, RuleError, Transform, TransformSpec},
};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error as ThisError;
use tracing::debug;

/// The step run after every listed transform, before the result is returned.
#[derive(Debug, Clone, Default)]
pub enum Finish {
    #[default]
    None,
    Named(Transform),
}

impl Finish {
    pub fn name(&self) -> Option<&str> {
        match self {
            Finish::None => None,
            Finish::Named(t) => Some(t.name()),
        }
    }
}

#[derive(Debug, Clone, ThisError)]
#[error("transform `{transform}` failed: {source}")]
pub struct StepFailure {
    pub transform: String,
    #[source]
    pub source: RuleError,
}

/// Character counts observed around one step. `removed` and `added` cover
/// the span between the longest unchanged prefix and suffix, so same-length
/// substitutions still count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTrace {
    pub name: String,
    pub chars_in: usize,
    pub chars_out: usize,
    pub removed: usize,
    pub added: usize,
}

#[derive(Debug, Clone)]
pub struct Applied {
    pub text: String,
    pub steps: Vec<StepTrace>,
}

/// Ordered transforms plus one optional finishing step. Immutable once built.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Transform>,
    finish: Finish,
}

impl Pipeline {
    pub fn new(steps: Vec<Transform>, finish: Finish) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in steps.iter().map(Transform::name).chain(finish.name()) {
            if !seen.insert(name) {
                return Err(Error::config(format!(
                    "transform name `{name}` appears twice in one pipeline; give one a label"
                )));
            }
        }
        Ok(Self { steps, finish })
    }

    pub fn from_specs(specs: &[TransformSpec], finish: Finish) -> Result<Self> {
        let steps = specs
            .iter()
            .map(transform::resolve)
            .collect::<Result<Vec<_>>>()?;
        Self::new(steps, finish)
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    pub fn finish(&self) -> &Finish {
        &self.finish
    }

    /// Step names in execution order, finishing step last.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(Transform::name)
            .chain(self.finish.name())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && matches!(self.finish, Finish::None)
    }

    pub fn apply(&self, text: &str) -> std::result::Result<String, StepFailure> {
        self.apply_traced(text).map(|a| a.text)
    }

    /// Runs every step in order, feeding each one's output to the next, and
    /// records character counts around each step.
    pub fn apply_traced(&self, text: &str) -> std::result::Result<Applied, StepFailure> {
        let finisher = match &self.finish {
            Finish::None => None,
            Finish::Named(t) => Some(t),
        };

        let mut current = text.to_string();
        let mut chars = current.chars().count();
        let mut steps = Vec::with_capacity(self.steps.len() + 1);

        for t in self.steps.iter().chain(finisher) {
            let next = t.apply(&current).map_err(|source| StepFailure {
                transform: t.name().to_string(),
                source,
            })?;
            let next_chars = next.chars().count();
            let (removed, added) = changed_chars(&current, &next);
            debug!(
                step = t.name(),
                chars_in = chars,
                chars_out = next_chars,
                removed,
                added,
                "transform"
            );
            steps.push(StepTrace {
                name: t.name().to_string(),
                chars_in: chars,
                chars_out: next_chars,
                removed,
                added,
            });
            current = next;
            chars = next_chars;
        }

        Ok(Applied {
            text: current,
            steps,
        })
    }
}

/// Characters removed from `before` and added in `after`, outside their
/// common prefix and suffix.
fn changed_chars(before: &str, after: &str) -> (usize, usize) {
    let prefix: usize = before
        .chars()
        .zip(after.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    let (before, after) = (&before[prefix..], &after[prefix..]);
    let suffix: usize = before
        .chars()
        .rev()
        .zip(after.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    (
        before[..before.len() - suffix].chars().count(),
        after[..after.len() - suffix].chars().count(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Transform {
        Transform::total(TransformSpec::new("upper"), |t| t.to_uppercase())
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let err = Pipeline::new(vec![upper(), upper()], Finish::None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn finishing_step_runs_last() {
        let exclaim = Transform::total(TransformSpec::new("exclaim"), |t| format!("{t}!"));
        let p = Pipeline::new(vec![upper()], Finish::Named(exclaim)).unwrap();
        let applied = p.apply_traced("hi").unwrap();
        assert_eq!(applied.text, "HI!");
        assert_eq!(p.step_names(), vec!["upper", "exclaim"]);
        assert_eq!(applied.steps[1].chars_out, 3);
    }

    #[test]
    fn changed_chars_counts_the_differing_middle() {
        assert_eq!(changed_chars("abc", "abc"), (0, 0));
        assert_eq!(changed_chars("“a”", "\"a\""), (3, 3));
        assert_eq!(changed_chars("prin-\nciples", "principles"), (2, 0));
        assert_eq!(changed_chars("aXa", "aYYa"), (1, 2));
        assert_eq!(changed_chars("", "new"), (0, 3));
    }

    #[test]
    fn failure_names_the_step() {
        let boom = Transform::fallible(TransformSpec::new("boom"), |_| Err(RuleError("no".into())));
        let p = Pipeline::new(vec![upper(), boom], Finish::None).unwrap();
        assert_eq!(p.apply("x").unwrap_err().transform, "boom");
    }
}
