//! Static file server for `budg serve`
//!
//! Serves a build output directory over HTTP. Directories resolve to their
//! `index.html`; a directory requested without a trailing slash is
//! permanently redirected (301) to the slashed URL.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::map_response;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

/// Value of the `Server` response header
pub const SERVER_NAME: &str = concat!("Budg/", env!("CARGO_PKG_VERSION"));

/// Where and what to serve
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub directory: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            host: "::".to_string(),
            port: 3000,
        }
    }
}

/// Router serving files under `directory`
pub fn router(directory: impl AsRef<Path>) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(directory.as_ref()))
        .layer(map_response(permanent_redirect))
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_NAME),
        ))
}

/// Turns `ServeDir`'s 307 directory redirects into 301
async fn permanent_redirect(mut response: Response) -> Response {
    if response.status() == StatusCode::TEMPORARY_REDIRECT {
        *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    }
    response
}

/// Serves until Ctrl-C
pub async fn serve(options: &ServeOptions) -> Result<()> {
    if !options.directory.is_dir() {
        anyhow::bail!("Directory not found: {}", options.directory.display());
    }

    let listener = TcpListener::bind((options.host.as_str(), options.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", options.host, options.port))?;
    let addr = listener.local_addr()?;

    println!("{}", serving_banner(addr));
    info!(directory = %options.directory.display(), "Serving directory");

    axum::serve(listener, router(&options.directory))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn serving_banner(addr: SocketAddr) -> String {
    let host = addr.ip().to_string();
    let url_host = if addr.is_ipv6() {
        format!("[{}]", host)
    } else {
        host.clone()
    };
    format!(
        "Serving HTTP on {} port {} (http://{}:{}/) ...",
        host,
        addr.port(),
        url_host,
        addr.port()
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get(dir: &Path, path: &str) -> String {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(dir);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("blog/index.html"), "<h1>blog</h1>").unwrap();
        dir
    }

    #[tokio::test]
    async fn serves_index_with_server_header() {
        let dir = site();
        let response = get(dir.path(), "/").await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.to_lowercase().contains(&format!("server: {}", SERVER_NAME).to_lowercase()));
        assert!(response.ends_with("<h1>home</h1>"));
    }

    #[tokio::test]
    async fn redirects_directory_without_slash() {
        let dir = site();
        let response = get(dir.path(), "/blog").await;

        assert!(response.starts_with("HTTP/1.1 301 Moved Permanently"));
        assert!(response.to_lowercase().contains("location: /blog/"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = site();
        let response = get(dir.path(), "/nope.html").await;
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn banner_brackets_ipv6() {
        let v6: SocketAddr = "[::]:3000".parse().unwrap();
        assert_eq!(
            serving_banner(v6),
            "Serving HTTP on :: port 3000 (http://[::]:3000/) ..."
        );

        let v4: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        assert_eq!(
            serving_banner(v4),
            "Serving HTTP on 127.0.0.1 port 8080 (http://127.0.0.1:8080/) ..."
        );
    }
}
