//! Development Server for StoreBridge
//!
//! Serves the `web/` bundle (index.html, wasm-pack output, compiled Elm
//! program) with correct MIME types and caching disabled, so a rebuild is
//! picked up on reload.
//!
//! Environment:
//! - `PORT` - listen port (default 8080)
//! - `STOREBRIDGE_WEB_ROOT` - directory to serve (default `web`)

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
    routing::get_service,
    Router,
};
use std::net::SocketAddr;
use tower_http::services::ServeDir;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEB_ROOT: &str = "web";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let web_root =
        std::env::var("STOREBRIDGE_WEB_ROOT").unwrap_or_else(|_| DEFAULT_WEB_ROOT.to_string());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let serve_dir = ServeDir::new(&web_root).append_index_html_on_directories(true);

    let app = Router::new()
        .fallback_service(get_service(serve_dir).handle_error(|_| async {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }))
        .layer(axum::middleware::from_fn(add_headers));

    println!("StoreBridge dev server");
    println!("  URL:  http://localhost:{}", port);
    println!("  Root: {}", web_root);
    println!("  Open the page in two tabs to watch cross-tab sync.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// MIME type for a request path, for the file kinds the bundle contains
fn content_type_for(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext {
        "js" | "mjs" => Some("application/javascript; charset=utf-8"),
        "wasm" => Some("application/wasm"),
        "css" => Some("text/css; charset=utf-8"),
        "html" => Some("text/html; charset=utf-8"),
        "json" | "map" => Some("application/json; charset=utf-8"),
        _ => None,
    }
}

/// Fix MIME types and disable caching
async fn add_headers(request: Request<Body>, next: axum::middleware::Next) -> Response<Body> {
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if let Some(content_type) = content_type_for(&path) {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("/pkg/storebridge_web_bg.wasm"), Some("application/wasm"));
        assert_eq!(
            content_type_for("/pkg/storebridge_web.js"),
            Some("application/javascript; charset=utf-8")
        );
        assert_eq!(content_type_for("/styles.css"), Some("text/css; charset=utf-8"));
        assert_eq!(content_type_for("/"), None);
        assert_eq!(content_type_for("/favicon.ico"), None);
    }
}
