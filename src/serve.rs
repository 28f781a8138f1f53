//! HTTP server for the dashboard
//!
//! `mood-dashboard serve` → read-only JSON API over the tables and views in
//! the store. Every response uses the same `{ok, data, error}` envelope.
//!
//! - `GET /api/tables` lists tables and views
//! - `GET /api/tables/{name}?limit=N` reads one of them
//! - `GET /api/sleep?limit=N` returns recent sleep sessions

use crate::db::{Database, DbError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

const DEFAULT_ROW_LIMIT: i64 = 500;
const DEFAULT_SLEEP_LIMIT: i64 = 30;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

#[derive(Deserialize, Debug, Default)]
struct LimitParams {
    limit: Option<i64>,
}

/// Status code and JSON body for one request
type Reply = (u16, String);

/// Start the API server on localhost
pub fn start(port: u16, db_path: &Path) -> std::io::Result<()> {
    let db = Database::open_at(db_path).map_err(std::io::Error::other)?;

    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::other(e.to_string()))?;

    info!(url = %format!("http://localhost:{}", port), db = %db_path.display(), "serving dashboard API");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&db, request) {
            warn!(error = %e, "failed to respond");
        }
    }

    Ok(())
}

fn handle_request(db: &Database, request: Request) -> std::io::Result<()> {
    let (status, body) = route(db, request.method(), request.url());
    debug!(method = %request.method(), url = request.url(), status, "request");

    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| std::io::Error::other("invalid content-type header"))?;
    let response = Response::from_string(body).with_status_code(status).with_header(header);
    request.respond(response)
}

fn route(db: &Database, method: &Method, url: &str) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let params: LimitParams = match serde_urlencoded::from_str(query) {
        Ok(params) => params,
        Err(e) => return reply(400, &ApiResponse::failure(format!("bad query: {}", e))),
    };

    if method != &Method::Get {
        return reply(405, &ApiResponse::failure("method not allowed"));
    }
    if let Some(limit) = params.limit.filter(|l| *l < 0) {
        return reply(400, &ApiResponse::failure(format!("limit must not be negative: {}", limit)));
    }

    match path.trim_end_matches('/') {
        "/api/tables" => respond(db.list_tables()),
        "/api/sleep" => respond(db.recent_sleep(params.limit.unwrap_or(DEFAULT_SLEEP_LIMIT))),
        p => match p.strip_prefix("/api/tables/") {
            Some(name) if !name.is_empty() && !name.contains('/') => match urlencoding::decode(name) {
                Ok(name) => respond(db.read_view(&name, Some(params.limit.unwrap_or(DEFAULT_ROW_LIMIT)))),
                Err(e) => reply(400, &ApiResponse::failure(format!("bad table name: {}", e))),
            },
            _ => reply(404, &ApiResponse::failure("not found")),
        },
    }
}

fn respond<T: Serialize>(result: Result<T, DbError>) -> Reply {
    match result {
        Ok(data) => reply(200, &ApiResponse::success(data)),
        Err(e @ DbError::NotFound(_)) => reply(404, &ApiResponse::failure(e.to_string())),
        Err(e) => {
            warn!(error = %e, "query failed");
            reply(500, &ApiResponse::failure(e.to_string()))
        }
    }
}

fn reply<T: Serialize>(status: u16, body: &ApiResponse<T>) -> Reply {
    match serde_json::to_string(body) {
        Ok(json) => (status, json),
        Err(e) => (500, format!(r#"{{"ok":false,"data":null,"error":"{}"}}"#, e)),
    }
}
