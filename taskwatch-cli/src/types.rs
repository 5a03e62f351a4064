//! Argument types used across CLI modules

use taskwatch_core::dto::task::FormField;

/// Parse a `name=value` form field argument
///
/// Only the first `=` separates name from value, so values may contain `=`.
pub fn parse_field(input: &str) -> Result<FormField, String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", input))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name cannot be empty in '{}'", input));
    }
    if name == "file" {
        return Err("field name 'file' is reserved for the upload".to_string());
    }

    Ok(FormField {
        name: name.to_string(),
        value: value.to_string(),
    })
}
