use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::logger::ServerLogger;
use super::router::Router;
use super::HandlerError;
use crate::protocol::errors::{bad_request, internal_server_error};
use crate::protocol::{decode, write_response, Response};

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

/// Runs one request through decode, dispatch and write. The stream is shut
/// down only after the request has been counted.
pub async fn handle_connection<S>(mut stream: S, router: Arc<Router>, logger: Arc<ServerLogger>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();

    let decoded = {
        let mut reader = BufReader::new(&mut stream);
        decode(&mut reader).await
    };

    let request = match decoded {
        Ok(request) => request,
        Err(err) => {
            logger.log_error(&format!("Invalid HTTP request received: {err}"));
            let response = bad_request("Invalid HTTP request");
            if let Err(err) = write_response(&mut stream, &response).await {
                logger.log_error(&format!("Error sending error response: {err}"));
            }
            let _ = stream.shutdown().await;
            return;
        }
    };

    let method = request.method();
    let path = request.path().to_string();

    let response: Response = match AssertUnwindSafe(router.dispatch(request)).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            logger.log_error(&format!("Error handling {method} {path}: {err}"));
            internal_server_error(&err)
        }
        Err(panic) => {
            let err = HandlerError::Panicked(panic_message(panic.as_ref()));
            logger.log_error(&format!("Error handling {method} {path}: {err}"));
            internal_server_error(&err)
        }
    };

    if let Err(err) = write_response(&mut stream, &response).await {
        logger.log_error(&format!("Error writing response for {method} {path}: {err}"));
    }
    logger.log_request(method.as_str(), &path, response.status(), started.elapsed());

    if let Err(err) = stream.shutdown().await {
        logger.log_warning(&format!("Error closing connection: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{status, Method};
    use crate::statics::StaticFiles;
    use tokio::io::{duplex, AsyncReadExt};

    fn test_router() -> Router {
        let dir = std::env::temp_dir().join("rusty_http_connection_tests_missing_root");
        let mut router = Router::new(Arc::new(StaticFiles::new(dir)));
        router.add_route(Method::Get, "/hello", |request| async move {
            let greeting = format!("hello {}", request.header("X-Name").unwrap_or("nobody"));
            Ok(Response::text(status::OK, "text/plain", greeting))
        });
        router.add_route(Method::Get, "/boom", |_| async {
            if true {
                panic!("handler exploded");
            }
            Ok(Response::empty(status::OK))
        });
        router
    }

    async fn roundtrip(raw: &[u8]) -> (String, Arc<ServerLogger>) {
        let router = Arc::new(test_router());
        let logger = Arc::new(ServerLogger::new(false, true));
        let (mut client, server) = duplex(64 * 1024);

        client.write_all(raw).await.unwrap();
        handle_connection(server, router, Arc::clone(&logger)).await;

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        (String::from_utf8_lossy(&reply).into_owned(), logger)
    }

    #[tokio::test]
    async fn test_routed_request() {
        let (reply, logger) = roundtrip(b"GET /hello HTTP/1.1\r\nX-Name: ada\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.ends_with("\r\n\r\nhello ada"));
        assert_eq!(logger.total_requests(), 1);
        assert_eq!(logger.endpoint_count("GET", "/hello"), 1);
    }

    #[tokio::test]
    async fn test_malformed_request_gets_400() {
        let (reply, logger) = roundtrip(b"NONSENSE\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(reply.contains("Bad Request: Invalid HTTP request"));
        assert_eq!(logger.total_requests(), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_gets_500() {
        let (reply, logger) = roundtrip(b"GET /boom HTTP/1.1\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(reply.contains("handler exploded"));
        assert_eq!(logger.status_count(500), 1);
    }

    #[tokio::test]
    async fn test_unmatched_request_falls_back_to_404() {
        let (reply, _) = roundtrip(b"GET /missing.html HTTP/1.1\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }
}
