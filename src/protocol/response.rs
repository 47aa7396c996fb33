use bytes::Bytes;

use super::request::Headers;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Empty,
    Text(String),
    Binary(Bytes),
}

impl Body {
    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Text(text) => text.len(),
            Body::Binary(blob) => blob.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Text(text) => text.as_bytes(),
            Body::Binary(blob) => blob,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Body,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Body) -> Self {
        Response {
            status,
            headers,
            body,
        }
    }

    /// Text response carrying its own `Content-Type` and `Content-Length`.
    pub fn text(status: u16, content_type: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        headers.insert("Content-Length".to_string(), text.len().to_string());
        Response::new(status, headers, Body::Text(text))
    }

    pub fn binary(status: u16, content_type: &str, blob: Bytes) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        headers.insert("Content-Length".to_string(), blob.len().to_string());
        Response::new(status, headers, Body::Binary(blob))
    }

    pub fn empty(status: u16) -> Self {
        Response::new(status, Headers::new(), Body::Empty)
    }

    /// Returns the same response with one more value appended for `name`.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}
