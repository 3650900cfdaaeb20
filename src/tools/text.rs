//! Text tools: `echo`, `reverse_text`, `count_words`, `capitalize_words`,
//! `format_json`.

use serde_json::{Value, json};

use crate::core::catalog::{Catalog, CatalogError, ParamType, ToolSpec, handler};

/// Sentinel returned by `format_json` for malformed input. In-band by
/// contract: the tool's return type is plain text and callers check for this
/// literal.
const INVALID_JSON: &str = "Invalid JSON format";

pub fn register(catalog: &mut Catalog) -> Result<(), CatalogError> {
    catalog.register_tool(
        ToolSpec::new("echo", "Echoes back the given message.")
            .required("message", ParamType::Text, "The message to echo")
            .returns(ParamType::Text),
        handler(|args| {
            let message = args.text("message")?;
            Ok(json!(format!("Echo: {message}")))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new("reverse_text", "Reverses the characters of a text.")
            .required("text", ParamType::Text, "Text to reverse")
            .returns(ParamType::Text),
        handler(|args| {
            let text = args.text("text")?;
            let reversed: String = text.chars().rev().collect();
            Ok(json!(reversed))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new("count_words", "Counts whitespace-separated words in a text.")
            .required("text", ParamType::Text, "Text to count words in")
            .returns(ParamType::Number),
        handler(|args| {
            let text = args.text("text")?;
            Ok(json!(text.split_whitespace().count()))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new(
            "capitalize_words",
            "Capitalizes the first letter of each word.",
        )
        .required("text", ParamType::Text, "Text to capitalize")
        .returns(ParamType::Text),
        handler(|args| {
            let text = args.text("text")?;
            Ok(json!(capitalize_words(text)))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new("format_json", "Pretty-prints a JSON text with indentation.")
            .required("text", ParamType::Text, "JSON text to format")
            .returns(ParamType::Text),
        handler(|args| {
            let text = args.text("text")?;
            Ok(json!(format_json(text)))
        }),
    )?;

    Ok(())
}

/// Naive title-casing: uppercase the first character of each
/// whitespace-delimited token, leave the remainder untouched, join with
/// single spaces. Parts after an embedded hyphen or apostrophe stay
/// lowercase ("well-known" -> "Well-known"); kept for compatibility with the
/// historical behavior.
fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_json(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| INVALID_JSON.to_string()),
        Err(_) => INVALID_JSON.to_string(),
    }
}
