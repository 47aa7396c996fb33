use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::response::Response;
use super::status::status_message;

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";

/// Serializes the whole response into one buffer. Repeated header names are
/// written as repeated lines, and nothing the caller did not set is added.
pub fn serialize(response: &Response) -> Bytes {
    let code = response.status();
    let body = response.body().as_bytes();
    let mut buf = BytesMut::with_capacity(128 + body.len());

    buf.put_slice(format!("{HTTP_VERSION} {code} {}", status_message(code)).as_bytes());
    buf.put_slice(CRLF);

    for (name, values) in response.headers().iter_all() {
        for value in values {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(CRLF);
        }
    }
    buf.put_slice(CRLF);
    buf.put_slice(body);

    buf.freeze()
}

pub async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&serialize(response)).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::request::Headers;
    use crate::protocol::response::Body;

    #[test]
    fn test_status_line_and_body() {
        let response = Response::text(200, "text/plain", "hello");
        let wire = serialize(&response);
        let text = std::str::from_utf8(&wire).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_repeated_header_lines() {
        let response = Response::empty(200)
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2");
        let wire = serialize(&response);
        let text = std::str::from_utf8(&wire).unwrap();
        assert!(text.contains("Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n"));
        assert!(!text.contains("a=1, b=2"));
    }

    #[test]
    fn test_unknown_status_and_no_implicit_headers() {
        let response = Response::new(299, Headers::new(), Body::Empty);
        assert_eq!(&serialize(&response)[..], b"HTTP/1.1 299 Unknown Status\r\n\r\n");
    }

    #[test]
    fn test_binary_body_is_verbatim() {
        let blob = Bytes::from_static(&[0, 159, 146, 150, 255]);
        let response = Response::binary(200, "application/octet-stream", blob.clone());
        let wire = serialize(&response);
        assert!(wire.ends_with(&blob));
    }

    #[tokio::test]
    async fn test_write_response() {
        let mut out: Vec<u8> = Vec::new();
        let response = Response::empty(204);
        write_response(&mut out, &response).await.unwrap();
        assert_eq!(out, b"HTTP/1.1 204 No Content\r\n\r\n");
    }
}
