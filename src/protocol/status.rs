pub const OK: u16 = 200;
pub const NO_CONTENT: u16 = 204;
pub const BAD_REQUEST: u16 = 400;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const PAYLOAD_TOO_LARGE: u16 = 413;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Canonical reason phrase for the codes this server knows about.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let reason = match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",

        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",

        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(reason)
}

/// Reason used on the status line.
pub fn status_message(code: u16) -> &'static str {
    reason_phrase(code).unwrap_or("Unknown Status")
}

pub fn is_error(code: u16) -> bool {
    code >= 400
}

pub fn is_client_error(code: u16) -> bool {
    (400..500).contains(&code)
}

pub fn is_server_error(code: u16) -> bool {
    code >= 500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(413), Some("Payload Too Large"));
        assert_eq!(reason_phrase(505), Some("HTTP Version Not Supported"));
        assert_eq!(reason_phrase(418), None);
        assert_eq!(status_message(418), "Unknown Status");
    }

    #[test]
    fn test_classification() {
        assert!(!is_error(204));
        assert!(is_error(404) && is_client_error(404) && !is_server_error(404));
        assert!(is_error(503) && is_server_error(503) && !is_client_error(503));
    }
}
