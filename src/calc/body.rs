const EXPRESSION_KEY: &str = "\"expression\"";

/// Pulls the string value of `"expression"` out of a JSON-like body.
///
/// This is a targeted scan rather than a JSON parse: it finds the key, the
/// colon after it, skips whitespace and takes everything up to the next
/// double quote. Escaped quotes are not understood. Returns `None` when any
/// step fails or the value is empty.
pub fn extract_expression(body: &str) -> Option<&str> {
    let key_start = body.find(EXPRESSION_KEY)?;
    let after_key = &body[key_start + EXPRESSION_KEY.len()..];
    let colon = after_key.find(':')?;

    let value = after_key[colon + 1..].trim_start();
    let value = value.strip_prefix('"')?;
    let closing_quote = value.find('"')?;

    let expression = &value[..closing_quote];
    if expression.is_empty() {
        return None;
    }
    Some(expression)
}
