use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use log::debug;

use super::HandlerError;
use crate::protocol::errors::not_found;
use crate::protocol::{Method, Request, Response};
use crate::statics::StaticFiles;
use crate::DynFuture;

pub type Handler =
    Arc<dyn Fn(Request) -> DynFuture<Result<Response, HandlerError>> + Send + Sync>;

const INDEX_FILE: &str = "index.html";

/// Exact `METHOD + target` lookup, with static files as the fallback for
/// anything unmatched.
pub struct Router {
    routes: HashMap<String, Handler>,
    statics: Arc<StaticFiles>,
}

impl Router {
    pub fn new(statics: Arc<StaticFiles>) -> Self {
        Router {
            routes: HashMap::new(),
            statics,
        }
    }

    /// No normalization: `GET` + `/metrics?x=1` is a different key from
    /// `GET` + `/metrics`.
    pub fn route_key(method: Method, target: &str) -> String {
        format!("{}{}", method.as_str(), target)
    }

    pub fn add_route<F, Fut>(&mut self, method: Method, target: &str, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(
            move |request| -> DynFuture<Result<Response, HandlerError>> {
                Box::pin(handler(request))
            },
        );
        self.routes.insert(Self::route_key(method, target), handler);
    }

    pub fn lookup(&self, method: Method, target: &str) -> Option<&Handler> {
        self.routes.get(&Self::route_key(method, target))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub async fn dispatch(&self, request: Request) -> Result<Response, HandlerError> {
        match self.lookup(request.method(), request.target()) {
            Some(handler) => handler(request).await,
            None => {
                debug!(
                    "No route for {} {}, trying static files",
                    request.method(),
                    request.target()
                );
                Ok(serve_static(&self.statics, request.path()).await)
            }
        }
    }
}

/// Maps a request path onto a path relative to the static root.
pub fn static_path(path: &str) -> &str {
    if path.is_empty() || path == "/" {
        return INDEX_FILE;
    }
    path.strip_prefix('/').unwrap_or(path)
}

pub async fn serve_static(statics: &StaticFiles, path: &str) -> Response {
    let relative = static_path(path);
    if statics.can_serve(relative).await {
        statics.serve(relative).await
    } else {
        not_found(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{status, Headers};
    use std::fs;

    fn request(method: &str, target: &str) -> Request {
        Request::new(method, target, Headers::new(), None).unwrap()
    }

    fn router_with_root(root: &std::path::Path) -> Router {
        let mut router = Router::new(Arc::new(StaticFiles::new(root)));
        router.add_route(Method::Get, "/ping", |_| async {
            Ok(Response::text(status::OK, "text/plain", "pong"))
        });
        router.add_route(Method::Post, "/fail", |_| async {
            Err(HandlerError::Io(std::io::Error::other("disk on fire")))
        });
        router
    }

    #[test]
    fn test_static_path() {
        let cases = vec![
            ("", "index.html"),
            ("/", "index.html"),
            ("/style.css", "style.css"),
            ("/assets/app.js", "assets/app.js"),
            ("//etc/passwd", "/etc/passwd"),
        ];
        for (path, expected) in cases {
            assert_eq!(static_path(path), expected, "mapping {path:?}");
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let router = router_with_root(dir.path());
        assert_eq!(router.len(), 2);
        assert!(router.lookup(Method::Get, "/ping").is_some());
        assert!(router.lookup(Method::Post, "/ping").is_none());
        assert!(router.lookup(Method::Get, "/ping?verbose=1").is_none());
        assert!(router.lookup(Method::Get, "/ping/").is_none());
        assert_eq!(Router::route_key(Method::Options, "/calculate"), "OPTIONS/calculate");
    }

    #[tokio::test]
    async fn test_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("ping"), "static ping").unwrap();
        let router = router_with_root(dir.path());

        let routed = router.dispatch(request("GET", "/ping")).await.unwrap();
        assert_eq!(routed.body().as_bytes(), b"pong");

        // a query string misses the route and falls through to the file
        let fallback = router.dispatch(request("GET", "/ping?x=1")).await.unwrap();
        assert_eq!(fallback.body().as_bytes(), b"static ping");

        let index = router.dispatch(request("DELETE", "/")).await.unwrap();
        assert_eq!(index.status(), 200);
        assert_eq!(index.body().as_bytes(), b"home");

        let missing = router.dispatch(request("GET", "/nope.txt")).await.unwrap();
        assert_eq!(missing.status(), 404);

        let traversal = router.dispatch(request("GET", "/../Cargo.toml")).await.unwrap();
        assert_eq!(traversal.status(), 404);

        assert!(router.dispatch(request("POST", "/fail")).await.is_err());
    }
}
