const SP: char = ' ';

#[inline]
fn is_line_terminator(symbol: u8) -> bool {
    symbol == b'\r' || symbol == b'\n'
}

/// Drops the `\n` / `\r\n` that ends a line read off the wire.
pub fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && is_line_terminator(line[end - 1]) {
        end -= 1;
    }
    &line[..end]
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Request-Line = Method SP Request-Target SP HTTP-Version
///
/// Splits on single spaces, so doubled spaces produce empty tokens and the
/// line is rejected.
pub fn split_request_line(line: &str) -> Result<(&str, &str, &str), String> {
    let parts: Vec<&str> = line.split(SP).collect();
    match parts.as_slice() {
        &[method, target, version] => Ok((method, target, version)),
        _ => Err(format!(
            "expected 3 space separated tokens in request line, got {}",
            parts.len()
        )),
    }
}

/// message-header = field-name ":" [ field-value ]
///
/// Splits on the first colon and trims both sides. Lines without a name
/// before the colon are not headers.
pub fn split_header(header_line: &str) -> Option<(&str, &str)> {
    match header_line.find(':') {
        Some(idx) if idx > 0 => {
            let name = header_line[..idx].trim();
            let value = header_line[idx + 1..].trim();
            Some((name, value))
        }
        _ => None,
    }
}

/// Content-Length as a strictly positive count.
pub fn parse_content_length(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|&length| length > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_ending() {
        let cases: Vec<(&[u8], &[u8])> = vec![
            (b"GET / HTTP/1.1\r\n", b"GET / HTTP/1.1"),
            (b"Host: a\n", b"Host: a"),
            (b"\r\n", b""),
            (b"no terminator", b"no terminator"),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_line_ending(input), expected);
        }
    }

    #[test]
    fn test_split_request_line() {
        assert_eq!(
            split_request_line("GET /index.html HTTP/1.1"),
            Ok(("GET", "/index.html", "HTTP/1.1"))
        );

        let negative_tests = vec![
            "GET /index.html",
            "GET  /index.html HTTP/1.1",
            "GET /index.html HTTP/1.1 extra",
            "GET",
        ];
        for line in negative_tests {
            assert!(split_request_line(line).is_err(), "{line:?} should be rejected");
        }
    }

    #[test]
    fn test_split_header() {
        let positive_tests: Vec<(&str, &str, &str)> = vec![
            ("Accept-Encoding:    gzip, deflate", "Accept-Encoding", "gzip, deflate"),
            ("Referer:", "Referer", ""),
            ("Host: localhost:8080", "Host", "localhost:8080"),
            ("  X-Padded  :  value  ", "X-Padded", "value"),
        ];
        for (input, expected_name, expected_value) in positive_tests {
            assert_eq!(split_header(input), Some((expected_name, expected_value)));
        }

        assert_eq!(split_header("no colon here"), None);
        assert_eq!(split_header(": nameless"), None);
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length("42"), Some(42));
        assert_eq!(parse_content_length("0"), None);
        assert_eq!(parse_content_length("-3"), None);
        assert_eq!(parse_content_length("ten"), None);
    }
}
