use crate::config::AppConfig;
use crate::error::{MapError, Result};
use crate::models::ViewOutcome;
use crate::processors::{build_view, DatasetCache, ViewOptions};
use crate::writers::{no_results_message, HtmlWriter, RenderedView};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::Mutex};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct AppState {
    cache: Arc<Mutex<DatasetCache>>,
    options: ViewOptions,
    page: String,
}

impl AppState {
    pub fn new(cache: DatasetCache, options: ViewOptions, writer: &HtmlWriter) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            options,
            page: writer.render_interactive(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResponse {
    #[serde(rename = "ok")]
    Markers(RenderedView),
    NoResults { message: String },
    Error { message: String },
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = match self {
            ApiResponse::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the dataset once, then serve the interactive map until Ctrl-C.
///
/// A dataset that cannot be loaded aborts startup.
pub async fn start_server(config: AppConfig) -> Result<()> {
    let path = config.input.path.clone();
    let cache = tokio::task::spawn_blocking(move || -> Result<DatasetCache> {
        let mut cache = DatasetCache::new(path);
        cache.get()?;
        Ok(cache)
    })
    .await??;

    let options = ViewOptions {
        zoom: config.map.zoom,
    };
    let state = Arc::new(AppState::new(cache, options, &config.map.html_writer()));
    let app = router(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|_| MapError::Config(format!("Invalid server host: {}", config.server.host)))?;
    let addr = SocketAddr::new(host, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving map on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn view_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> ApiResponse {
    let cache = Arc::clone(&state.cache);
    let options = state.options;
    let query = params.q;

    // Loading may hit the disk, keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        let mut cache = cache.blocking_lock();
        build_view(&mut *cache, &query, &options)
    })
    .await
    .map_err(MapError::from)
    .and_then(|result| result);

    match outcome {
        Ok(ViewOutcome::Markers(view)) => ApiResponse::Markers(RenderedView::from(&view)),
        Ok(ViewOutcome::NoResults) => ApiResponse::NoResults {
            message: no_results_message().to_string(),
        },
        Err(e) => {
            error!("Failed to build map view: {}", e);
            ApiResponse::Error {
                message: e.to_string(),
            }
        }
    }
}
