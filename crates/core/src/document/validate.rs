//! Presence checks applied to source content objects.
//! Nothing beyond the shape of `keywords` is validated.
use std::fmt;

use serde_json::Value;

/// Why a subject (or a whole category) produced no quiz record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CategoryNotAnObject,
    ContentNotAnObject,
    MissingKeywords,
    KeywordsNotAnArray,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SkipReason::CategoryNotAnObject => "category is not an object",
            SkipReason::ContentNotAnObject => "content is not an object",
            SkipReason::MissingKeywords => "keywords missing",
            SkipReason::KeywordsNotAnArray => "keywords is not an array",
        };
        f.write_str(msg)
    }
}

/// Return the `keywords` array of a content object, or the reason the
/// subject is not eligible.
pub fn eligible_keywords(content: &Value) -> Result<&Vec<Value>, SkipReason> {
    let object = content.as_object().ok_or(SkipReason::ContentNotAnObject)?;
    match object.get("keywords") {
        None => Err(SkipReason::MissingKeywords),
        Some(Value::Array(keywords)) => Ok(keywords),
        Some(_) => Err(SkipReason::KeywordsNotAnArray),
    }
}

/// `style_modifiers` when it is an array, otherwise empty.
pub fn style_modifiers(content: &Value) -> Vec<Value> {
    match content.get("style_modifiers") {
        Some(Value::Array(modifiers)) => modifiers.clone(),
        _ => Vec::new(),
    }
}
