use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cli::Args;
use crate::web::api::{
    get_videos, get_window, post_align, scan_video, upload_log, upload_video, AppState,
};
use crate::web::assets::{index_handler, static_handler};
use crate::window::WindowCache;

/// Raw-body video uploads can be large.
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

pub async fn run_server(args: Args) -> Result<()> {
    std::fs::create_dir_all(args.upload_dir())?;
    std::fs::create_dir_all(args.playable_dir())?;

    let host: IpAddr = args.host;
    let port = args.port;
    let playable_dir = args.playable_dir();

    let state = Arc::new(AppState {
        args,
        windows: Mutex::new(WindowCache::default()),
    });

    let mut current_port = port;
    let listener = loop {
        let addr = SocketAddr::new(host, current_port);
        match TcpListener::bind(addr) {
            Ok(listener) => {
                listener.set_nonblocking(true)?;
                info!("Successfully bound to {}", addr);
                break listener;
            }
            Err(e) => {
                warn!("Failed to bind to {}: {}. Trying next port...", addr, e);
                current_port += 1;
                if current_port == 0 {
                    return Err(anyhow::anyhow!("No available ports found"));
                }
            }
        }
    };

    let app = Router::new()
        .route("/api/videos", get(get_videos).post(upload_video))
        .route("/api/videos/:name/window", get(get_window))
        .route("/api/videos/:name/scan", get(scan_video))
        .route("/api/logs", post(upload_log))
        .route("/api/align", post(post_align))
        .nest_service("/media", ServeDir::new(playable_dir))
        .route("/", get(index_handler))
        .route("/*path", get(static_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let tokio_listener = tokio::net::TcpListener::from_std(listener)?;
    info!(
        "clockjump server started on http://{:?}",
        tokio_listener.local_addr()?
    );

    axum::serve(tokio_listener, app).await?;

    Ok(())
}
