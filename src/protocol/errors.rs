use std::fmt;

use serde::Serialize;

use super::response::Response;
use super::status;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_reason(code: u16) -> &'static str {
    status::reason_phrase(code).unwrap_or("Unknown Error")
}

/// HTML error page, used for navigational and static-serving failures.
/// Falls back to the reason phrase when no message is given.
pub fn html_error(code: u16, message: Option<&str>) -> Response {
    let reason = error_reason(code);
    let page = render_error_page(code, reason, message.unwrap_or(reason));
    Response::text(code, HTML_CONTENT_TYPE, page)
}

/// Flat `{"error": "..."}` body for API-style handlers.
pub fn json_error(code: u16, message: &str) -> Response {
    let body = serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| String::from(r#"{"error": "unknown error"}"#));
    Response::text(code, JSON_CONTENT_TYPE, body)
}

/// `Error <code>: <message>` in plain text.
pub fn text_error(code: u16, message: &str) -> Response {
    Response::text(code, TEXT_CONTENT_TYPE, format!("Error {code}: {message}"))
}

pub fn not_found(uri: &str) -> Response {
    let message = format!("The requested resource '{uri}' was not found on this server.");
    html_error(status::NOT_FOUND, Some(message.as_str()))
}

pub fn bad_request(reason: &str) -> Response {
    let message = format!("Bad Request: {reason}");
    html_error(status::BAD_REQUEST, Some(message.as_str()))
}

pub fn method_not_allowed(method: &str, allowed: &[&str]) -> Response {
    let message = format!("HTTP method '{method}' is not allowed for this resource.");
    let response = html_error(status::METHOD_NOT_ALLOWED, Some(message.as_str()));
    if allowed.is_empty() {
        response
    } else {
        response.with_header("Allow", allowed.join(", "))
    }
}

/// The cause is echoed to the client.
pub fn internal_server_error(cause: impl fmt::Display) -> Response {
    let message = format!("An internal server error occurred: {cause}");
    html_error(status::INTERNAL_SERVER_ERROR, Some(message.as_str()))
}

pub fn payload_too_large(max_size: u64) -> Response {
    let message = format!("Request payload exceeds maximum allowed size of {max_size} bytes.");
    html_error(status::PAYLOAD_TOO_LARGE, Some(message.as_str()))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_error_page(code: u16, reason: &str, message: &str) -> String {
    let message = escape_html(message);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{code} {reason}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #667eea; margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center; }}
        .error-container {{ background: white; border-radius: 12px; padding: 40px; text-align: center; max-width: 500px; margin: 20px; }}
        .error-code {{ font-size: 72px; font-weight: bold; color: #e74c3c; margin: 0; }}
        .error-title {{ font-size: 24px; color: #2c3e50; margin: 20px 0; }}
        .error-message {{ color: #7f8c8d; line-height: 1.6; margin-bottom: 30px; }}
        .home-link {{ display: inline-block; background: #3498db; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; }}
    </style>
</head>
<body>
    <div class="error-container">
        <h1 class="error-code">{code}</h1>
        <h2 class="error-title">{reason}</h2>
        <p class="error-message">{message}</p>
        <a href="/" class="home-link">Go Home</a>
    </div>
</body>
</html>
"#
    )
}
