// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Static asset server.
//!
//! Serves a directory of static files. Any path that isn't a file gets the directory's
//! `index.html`, so client-side routes load the page.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::config;

/// Environment variable that overrides the configured port.
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the router serving `root`.
pub fn router(root: &Path) -> Router {
    let index = ServeFile::new(root.join("index.html"));
    Router::new().fallback_service(ServeDir::new(root).fallback(index))
}

/// Picks the port to listen on: an explicit port wins, then the environment, then the
/// configuration.
pub fn resolve_port(explicit: Option<u16>, config: &config::Server) -> Result<u16, ServerError> {
    pick_port(explicit, std::env::var(PORT_ENV).ok().as_deref(), config)
}

fn pick_port(
    explicit: Option<u16>,
    env: Option<&str>,
    config: &config::Server,
) -> Result<u16, ServerError> {
    if let Some(port) = explicit {
        return Ok(port);
    }
    match env.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| ServerError::InvalidPort(value.to_string())),
        None => Ok(config.port()),
    }
}

/// Serves `root` on all interfaces until ctrl-c.
pub async fn serve(root: PathBuf, port: u16) -> Result<(), ServerError> {
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    serve_on(listener, root, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down server");
    })
    .await
}

/// Serves `root` on an already bound listener until `shutdown` completes.
pub async fn serve_on<F>(
    listener: TcpListener,
    root: PathBuf,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        address = %listener.local_addr()?,
        root = ?root,
        "Serving static files"
    );
    axum::serve(listener, router(&root))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
