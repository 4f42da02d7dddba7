use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geometry::Shape;

mod store;

use store::ShapeStore;

#[derive(Clone)]
struct AppState {
    store: Arc<ShapeStore>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("MISSIONS_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("invalid MISSIONS_ADDR");
    let store_path = env::var("MISSIONS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/shapes.json"));

    let state = AppState {
        store: Arc::new(ShapeStore::new(store_path)),
    };
    info!("shape store at {:?}", state.store.path());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/shapes", get(list_shapes).post(create_shape))
        .route(
            "/api/shapes/:name",
            get(get_mission).delete(delete_mission),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("mission server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn create_shape(
    State(state): State<AppState>,
    Json(shape): Json<Shape>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let name_ok = shape
        .mission_name
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());
    if !name_ok {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Shape is missing a mission name",
        ));
    }
    if let Err(e) = shape.geometry.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, format!("Invalid shape: {e}")));
    }

    let saved = state.store.insert(shape).await.map_err(|e| {
        warn!("shape insert failed: {e}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save shape data",
        )
    })?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_shapes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Shape>>, (StatusCode, Json<Value>)> {
    let shapes = state.store.all().await.map_err(|e| {
        warn!("shape list failed: {e}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch missions",
        )
    })?;
    Ok(Json(shapes))
}

async fn get_mission(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Result<Json<Vec<Shape>>, (StatusCode, Json<Value>)> {
    let shapes = state.store.for_mission(&name).await.map_err(|e| {
        warn!("mission fetch failed: {e}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch mission")
    })?;

    if shapes.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "Mission not found"));
    }
    Ok(Json(shapes))
}

async fn delete_mission(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let deleted = state.store.delete_mission(&name).await.map_err(|e| {
        warn!("mission delete failed: {e}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to delete mission",
        )
    })?;

    if deleted == 0 {
        return Err(api_error(StatusCode::NOT_FOUND, "Mission not found"));
    }

    info!(mission = %name, deleted, "mission deleted");
    Ok(Json(json!({ "deleted": deleted })))
}
