use std::fmt;
use std::str::FromStr;

use http::Uri;
use multimap::MultiMap;
use thiserror::Error;

/// Header multimap: every name keeps the values of its lines in arrival order.
/// Names are stored as received, so lookups are case sensitive.
pub type Headers = MultiMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RequestError;

    // Method tokens are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RequestError::UnknownMethod(s.to_string()))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("unknown request method {0:?}")]
    UnknownMethod(String),

    #[error("request target is missing")]
    MissingTarget,

    #[error("invalid request target {0:?}")]
    InvalidTarget(String),
}

#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    target: String,
    uri: Uri,
    headers: Headers,
    body: Option<String>,
}

impl Request {
    /// Validates the method token and the request target and builds an
    /// immutable request out of them.
    pub fn new(
        method: &str,
        target: &str,
        headers: Headers,
        body: Option<String>,
    ) -> Result<Self, RequestError> {
        let method = method.parse::<Method>()?;
        let uri = Request::validate_target(target)?;
        Ok(Request::from_parts(method, target, uri, headers, body))
    }

    pub(crate) fn validate_target(target: &str) -> Result<Uri, RequestError> {
        if target.is_empty() {
            return Err(RequestError::MissingTarget);
        }
        target
            .parse::<Uri>()
            .map_err(|_| RequestError::InvalidTarget(target.to_string()))
    }

    pub(crate) fn from_parts(
        method: Method,
        target: &str,
        uri: Uri,
        headers: Headers,
        body: Option<String>,
    ) -> Self {
        Request {
            method,
            target: target.to_string(),
            uri,
            headers,
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Raw request target as it appeared on the request line, query included.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Path component of the target, without the query.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of the header `name`, matched with exact case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert_eq!("Options".parse::<Method>(), Ok(Method::Options));
        assert_eq!(
            "CONNECT".parse::<Method>(),
            Err(RequestError::UnknownMethod("CONNECT".to_string()))
        );
    }

    #[test]
    fn test_new_validates_fields() {
        let request = Request::new("get", "/files?x=1", Headers::new(), None).unwrap();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.target(), "/files?x=1");
        assert_eq!(request.path(), "/files");
        assert!(request.body().is_none());

        assert_eq!(
            Request::new("GET", "", Headers::new(), None).unwrap_err(),
            RequestError::MissingTarget
        );
        assert!(matches!(
            Request::new("GET", "/a b", Headers::new(), None),
            Err(RequestError::InvalidTarget(_))
        ));
        assert!(matches!(
            Request::new("BREW", "/", Headers::new(), None),
            Err(RequestError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_header_lookup_is_case_sensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let request = Request::new("GET", "/", headers, None).unwrap();
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("content-type"), None);
    }
}
