use log::debug;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::primitives::{
    is_blank, parse_content_length, split_header, split_request_line, strip_line_ending,
};
use crate::protocol::request::{Headers, Method, Request, RequestError};

const CONTENT_LENGTH: &str = "Content-Length";
// upfront reservation for a body; the buffer grows past it as bytes arrive
const BODY_PREALLOC_LIMIT: usize = 8 * 1024;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("request line is missing")]
    EmptyRequestLine,

    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

async fn read_line<R>(reader: &mut R) -> Result<Option<String>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    if reader.read_until(b'\n', &mut raw).await? == 0 {
        return Ok(None);
    }
    Ok(Some(
        String::from_utf8_lossy(strip_line_ending(&raw)).into_owned(),
    ))
}

async fn read_headers<R>(reader: &mut R) -> Result<Headers, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Headers::new();
    while let Some(line) = read_line(reader).await? {
        if is_blank(&line) {
            break;
        }
        match split_header(&line) {
            Some((name, value)) => headers.insert(name.to_string(), value.to_string()),
            None => debug!("skipping header line without a name: {:?}", line),
        }
    }
    Ok(headers)
}

/// Reads exactly `Content-Length` bytes, or whatever arrives before the
/// stream ends.
async fn read_body<R>(reader: &mut R, headers: &Headers) -> Result<Option<String>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let length = match headers.get(CONTENT_LENGTH).and_then(|v| parse_content_length(v)) {
        Some(length) => length,
        None => return Ok(None),
    };

    let mut raw = Vec::with_capacity(length.min(BODY_PREALLOC_LIMIT));
    (&mut *reader).take(length as u64).read_to_end(&mut raw).await?;
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

/// Decodes a single request off `reader`. Nothing is returned unless the
/// request line, method and target are all valid.
pub async fn decode<R>(reader: &mut R) -> Result<Request, DecodeError>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = match read_line(reader).await? {
        Some(line) if !is_blank(&line) => line,
        _ => return Err(DecodeError::EmptyRequestLine),
    };

    let (method, target, _version) =
        split_request_line(&request_line).map_err(DecodeError::MalformedRequestLine)?;

    // Method and target are validated before anything else is read
    let method: Method = method.parse()?;
    let uri = Request::validate_target(target)?;

    let headers = read_headers(reader).await?;
    let body = read_body(reader, &headers).await?;

    Ok(Request::from_parts(method, target, uri, headers, body))
}
