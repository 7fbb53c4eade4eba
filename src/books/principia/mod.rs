pub mod algebra_day;
pub mod federalist;
pub mod political_economy_mill;
pub mod psychology_james;

use crate::registry::HandlerDef;

pub const COLLECTION: &str = "principia";

pub const HANDLERS: &[fn() -> HandlerDef] = &[
    psychology_james::handler,
    political_economy_mill::handler,
    algebra_day::handler,
    federalist::handler,
];

pub(crate) fn def(
    identifier: &str,
    title: &str,
    author: &str,
    date: &str,
    notes: &str,
    pre_1800_typeface: bool,
    finish: &str,
) -> HandlerDef {
    HandlerDef {
        origin: format!("builtin:{COLLECTION}/{identifier}"),
        identifier: identifier.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        date: date.to_string(),
        notes: notes.to_string(),
        collection: Some(COLLECTION.to_string()),
        transforms: super::standard_transforms(pre_1800_typeface),
        finish: Some(finish.to_string()),
    }
}
