//! Request dispatcher (C11, spec.md §4.10): routes `/`, `/fetch`,
//! `/download`, `/validate`, `/ping` to the handlers in [`handlers`],
//! implemented as a [`crate::service::Service`] so it composes with
//! [`crate::layer::LogLayer`] the same way every other service in this
//! crate does.

pub mod handlers;
pub mod options;
pub mod request;

use crate::context::Context;
use crate::error::BoxError;
use crate::layer::RequestLabel;
use crate::service::Service;
use crate::state::AppState;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Transport-agnostic inbound request. `main.rs` adapts hyper's
/// `Request<Incoming>` into this shape before handing it to the
/// dispatcher, keeping every `Service` impl free of hyper types.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RequestLabel for HttpRequest {
    fn request_label(&self) -> String {
        format!("{:?} {}", self.method, self.path)
    }
}

/// Transport-agnostic outbound response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn oms(body: Vec<u8>, set_cookies: &[String], part_cur: u32, part_cnt: u32) -> Self {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/octet-stream".to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
            ("Connection".to_string(), "close".to_string()),
            ("X-Operetta-Page".to_string(), part_cur.to_string()),
            ("X-Operetta-Pages".to_string(), part_cnt.to_string()),
        ];
        for cookie in set_cookies {
            headers.push(("Set-Cookie".to_string(), cookie.clone()));
        }
        Self {
            status: 200,
            headers,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: b"not found".to_vec(),
        }
    }

    fn bad_request(msg: &str) -> Self {
        Self {
            status: 400,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: msg.as_bytes().to_vec(),
        }
    }
}

/// The single router `Service`. Every endpoint in spec.md §4.10 is one
/// match arm here, delegating to [`handlers`] for the actual work.
#[derive(Default)]
pub struct Dispatcher;

impl Service<AppState, HttpRequest> for Dispatcher {
    type Response = HttpResponse;
    type Error = BoxError;

    async fn serve(&self, ctx: Context<AppState>, req: HttpRequest) -> Result<Self::Response, Self::Error> {
        let state = ctx.state();
        let path = req.path.split('?').next().unwrap_or(&req.path);

        let response = match (req.method, path) {
            (HttpMethod::Get, "/ping") => HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                body: handlers::ping(),
            },
            (HttpMethod::Post, "/") => {
                let rendered = handlers::handle_legacy_post(state, &req.body).await;
                HttpResponse::oms(rendered.body, &rendered.set_cookies, rendered.part_cur, rendered.part_cnt)
            }
            (HttpMethod::Get, "/") => HttpResponse::oms(handlers::bootstrap_page(), &[], 1, 1),
            (HttpMethod::Get, "/fetch") | (HttpMethod::Post, "/fetch") => {
                let rendered = handlers::handle_fetch_debug(state, &req.query).await;
                if rendered.part_cnt == 0 {
                    HttpResponse::bad_request("missing url parameter")
                } else {
                    HttpResponse::oms(rendered.body, &rendered.set_cookies, rendered.part_cur, rendered.part_cnt)
                }
            }
            (HttpMethod::Get, "/download") => match req.query.get("url") {
                Some(url) => HttpResponse {
                    status: 302,
                    headers: vec![("Location".to_string(), url.clone())],
                    body: Vec::new(),
                },
                None => HttpResponse::bad_request("missing url parameter"),
            },
            (HttpMethod::Get, "/validate") => match req.query.get("url") {
                Some(url) => {
                    let report = handlers::validate_oms(state, url).await;
                    HttpResponse {
                        status: 200,
                        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                        body: serde_json::to_vec(&report).unwrap_or_default(),
                    }
                }
                None => HttpResponse::bad_request("missing url parameter"),
            },
            _ => HttpResponse::not_found(),
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::Arc;

    fn test_state() -> Context<AppState> {
        Context::new(Arc::new(AppState::new(Config::from_env())))
    }

    #[tokio::test]
    async fn ping_returns_pong() {
        let dispatcher = Dispatcher::default();
        let resp = dispatcher
            .serve(
                test_state(),
                HttpRequest {
                    method: HttpMethod::Get,
                    path: "/ping".to_string(),
                    query: HashMap::new(),
                    body: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"pong\n");
    }

    #[tokio::test]
    async fn fetch_without_url_is_bad_request() {
        let dispatcher = Dispatcher::default();
        let resp = dispatcher
            .serve(
                test_state(),
                HttpRequest {
                    method: HttpMethod::Get,
                    path: "/fetch".to_string(),
                    query: HashMap::new(),
                    body: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 400);
    }

    #[tokio::test]
    async fn empty_post_body_serves_bootstrap_page() {
        let dispatcher = Dispatcher::default();
        let resp = dispatcher
            .serve(
                test_state(),
                HttpRequest {
                    method: HttpMethod::Post,
                    path: "/".to_string(),
                    query: HashMap::new(),
                    body: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        let has_set_cookie = resp.headers.iter().any(|(k, _)| k == "Set-Cookie");
        assert!(has_set_cookie);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let dispatcher = Dispatcher::default();
        let resp = dispatcher
            .serve(
                test_state(),
                HttpRequest {
                    method: HttpMethod::Get,
                    path: "/nope".to_string(),
                    query: HashMap::new(),
                    body: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
    }
}
