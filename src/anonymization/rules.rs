//! Field classification rules
//!
//! Rules are evaluated in table order and are not exclusive: every rule whose
//! predicate matches fires, so a field with both `id="title"` and
//! `type="string"` is randomized twice.

use crate::adapters::xml::Element;

pub const HTML_TEXT_TYPE: &str = "text/html";

const IDENTITY_FIELD_IDS: [&str; 3] = ["author", "title", "assignee"];
const SCALAR_FIELD_TYPES: [&str; 5] = ["text", "string", "integer", "float", "currency"];
const ENUM_TYPE_MARKER: &str = "enum:@";

/// How a field's text is randomized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PlainText,
    Markup,
}

/// One ordered classification rule
pub struct FieldRule {
    pub name: &'static str,
    pub applies: fn(&Element) -> bool,
    pub strategy: Strategy,
}

pub static FIELD_RULES: [FieldRule; 5] = [
    FieldRule {
        name: "identity_field",
        applies: is_identity_field,
        strategy: Strategy::PlainText,
    },
    FieldRule {
        name: "html_text",
        applies: is_html_text,
        strategy: Strategy::Markup,
    },
    FieldRule {
        name: "other_text_type",
        applies: is_other_text_type,
        strategy: Strategy::PlainText,
    },
    FieldRule {
        name: "scalar_type",
        applies: is_scalar_type,
        strategy: Strategy::PlainText,
    },
    FieldRule {
        name: "enum_type",
        applies: is_enum_type,
        strategy: Strategy::PlainText,
    },
];

/// Rules that fire for `field`, in evaluation order
pub fn matching_rules(field: &Element) -> impl Iterator<Item = &'static FieldRule> + '_ {
    FIELD_RULES.iter().filter(move |rule| (rule.applies)(field))
}

fn is_identity_field(field: &Element) -> bool {
    field
        .attribute("id")
        .is_some_and(|id| IDENTITY_FIELD_IDS.contains(&id))
}

pub fn is_html_text(element: &Element) -> bool {
    element.attribute("text-type") == Some(HTML_TEXT_TYPE)
}

fn is_other_text_type(field: &Element) -> bool {
    field
        .attribute("text-type")
        .is_some_and(|text_type| !text_type.is_empty() && text_type != HTML_TEXT_TYPE)
}

fn is_scalar_type(field: &Element) -> bool {
    field
        .attribute("type")
        .is_some_and(|kind| SCALAR_FIELD_TYPES.contains(&kind))
}

fn is_enum_type(field: &Element) -> bool {
    field
        .attribute("type")
        .is_some_and(|kind| kind.contains(ENUM_TYPE_MARKER))
}
