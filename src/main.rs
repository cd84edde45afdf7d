//! Operetta: transcoding proxy that serves ordinary web pages to
//! legacy Opera Mini J2ME clients as OMS (spec.md §1-§2).

mod config;
mod context;
mod css;
mod dispatch;
mod error;
mod fetch;
mod image;
mod layer;
mod oms;
mod service;
mod session;
mod siteprofile;
mod state;
mod transcode;

use bytes::Bytes;
use config::Config;
use context::Context;
use dispatch::{Dispatcher, HttpMethod, HttpRequest};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use layer::{Layer, LogLayer};
use service::Service;
use state::AppState;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Slowloris-resistant connection timeouts (spec.md §4.10, §5).
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(5);
const BODY_READ_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "operetta listening");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(?err, "accept failed");
                        continue;
                    }
                };
                let state = state.clone();
                let mut shutdown_rx = shutdown_rx.clone();
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let svc = service_fn(move |req| serve_one(state.clone(), req));
                    let conn = http1::Builder::new()
                        .header_read_timeout(HEADER_READ_TIMEOUT)
                        .serve_connection(io, svc);
                    tokio::pin!(conn);
                    tokio::select! {
                        result = conn.as_mut() => {
                            if let Err(err) = result {
                                warn!(%peer, ?err, "connection error");
                            }
                        }
                        _ = shutdown_rx.changed() => {
                            conn.as_mut().graceful_shutdown();
                            let _ = conn.await;
                        }
                        _ = tokio::time::sleep(IDLE_TIMEOUT) => {
                            warn!(%peer, "connection idle timeout");
                        }
                    }
                });
            }
            _ = shutdown_rx.changed() => {
                info!("shutting down accept loop");
                break;
            }
        }
    }

    Ok(())
}

async fn serve_one(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
    let method = match req.method().as_str() {
        "POST" => HttpMethod::Post,
        _ => HttpMethod::Get,
    };
    let path = req.uri().path().to_string();
    let query = req
        .uri()
        .query()
        .map(parse_query)
        .unwrap_or_default();

    let body = tokio::time::timeout(BODY_READ_TIMEOUT, req.into_body().collect())
        .await
        .ok()
        .and_then(|r| r.ok())
        .map(|collected| collected.to_bytes().to_vec())
        .unwrap_or_default();

    let http_req = HttpRequest {
        method,
        path,
        query,
        body,
    };

    let ctx = Context::new(state);
    let dispatcher = LogLayer.layer(Dispatcher);
    let response = match dispatcher.serve(ctx, http_req).await {
        Ok(resp) => resp,
        Err(err) => {
            error!(?err, "dispatcher error");
            dispatch::HttpResponse {
                status: 500,
                headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                body: b"internal error".to_vec(),
            }
        }
    };

    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    Ok(builder.body(Full::new(Bytes::from(response.body))).unwrap())
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut it = pair.splitn(2, '=');
            let key = it.next()?;
            let value = it.next().unwrap_or("");
            Some((
                percent_encoding::percent_decode_str(key).decode_utf8_lossy().into_owned(),
                percent_encoding::percent_decode_str(value).decode_utf8_lossy().into_owned(),
            ))
        })
        .collect()
}
