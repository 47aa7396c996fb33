use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use super::logger::ServerLogger;
use super::router::{serve_static, Router};
use super::HandlerError;
use crate::calc::{self, extract_expression};
use crate::config::Config;
use crate::protocol::errors::json_error;
use crate::protocol::{status, Method, Request, Response};
use crate::statics::StaticFiles;

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

const MISSING_EXPRESSION: &str = "Invalid request: expression is required";

#[derive(Serialize)]
struct Calculation<'a> {
    result: f64,
    expression: &'a str,
}

/// The fixed route table every server starts with.
pub fn default_router(
    config: Arc<Config>,
    logger: Arc<ServerLogger>,
    statics: Arc<StaticFiles>,
) -> Router {
    let mut router = Router::new(Arc::clone(&statics));

    let index_statics = Arc::clone(&statics);
    router.add_route(Method::Get, "/", move |request| {
        let statics = Arc::clone(&index_statics);
        async move { Ok(serve_static(&statics, request.path()).await) }
    });

    let metrics_logger = Arc::clone(&logger);
    router.add_route(Method::Get, "/metrics", move |_| {
        let text = metrics_logger.render_metrics();
        async move { Ok(Response::text(status::OK, TEXT_PLAIN, text)) }
    });

    router.add_route(Method::Get, "/config", move |_| {
        let text = config.to_string();
        async move { Ok(Response::text(status::OK, TEXT_PLAIN, text)) }
    });

    router.add_route(Method::Get, "/files", move |_| {
        let statics = Arc::clone(&statics);
        async move { Ok(list_files(&statics).await) }
    });

    router.add_route(Method::Post, "/calculate", move |request| {
        let logger = Arc::clone(&logger);
        async move { calculate(&logger, request) }
    });

    router.add_route(Method::Options, "/calculate", |_| async {
        Ok(with_cors(Response::empty(status::NO_CONTENT)))
    });

    router
}

fn with_cors(response: Response) -> Response {
    response
        .with_header("Access-Control-Allow-Origin", "*")
        .with_header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .with_header("Access-Control-Allow-Headers", "Content-Type")
}

async fn list_files(statics: &StaticFiles) -> Response {
    let files = statics.list_files().await;

    let mut text = String::from("Static Files Available\n=====================\n");
    if files.is_empty() {
        let _ = writeln!(text, "No files found in {}", statics.root().display());
    }
    for file in &files {
        let _ = writeln!(text, "- {file}");
    }
    Response::text(status::OK, TEXT_PLAIN, text)
}

/// `POST /calculate` with `{"expression": "..."}`. Every answer, including
/// failures, is JSON with CORS headers.
pub fn calculate(logger: &ServerLogger, request: Request) -> Result<Response, HandlerError> {
    let expression = match request.body().and_then(extract_expression) {
        Some(expression) => expression,
        None => return Ok(with_cors(json_error(status::BAD_REQUEST, MISSING_EXPRESSION))),
    };

    let response = match calc::calculate(expression) {
        Ok(evaluation) => {
            let body = serde_json::to_string(&Calculation {
                result: evaluation.result,
                expression: &evaluation.expression,
            })?;
            Response::text(status::OK, APPLICATION_JSON, body)
        }
        Err(err) => {
            logger.log_warning(&format!("Calculation of {expression:?} failed: {err}"));
            json_error(status::BAD_REQUEST, &err.to_string())
        }
    };
    Ok(with_cors(response))
}
