use fitdesk_core::{Config, Error, Paths};
use fitdesk_schema::{load_member, load_workout_session};
use fitdesk_storage::RecordStore;
use std::sync::Arc;
use tracing::info;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

// ---------------------------------------------------------------------------
// Shared state passed to request handlers
// ---------------------------------------------------------------------------

/// The store handle is owned here and cloned into each handler.
#[derive(Clone)]
struct AppState {
    store: Arc<RecordStore>,
}

pub async fn run(cli_host: Option<String>, cli_port: Option<u16>) -> anyhow::Result<()> {
    let paths = Paths::new();
    paths.ensure_dirs()?;
    let config = Config::load_or_default(&paths)?;

    // Resolve host/port: CLI args override config values
    let host = cli_host.unwrap_or_else(|| config.server.host.clone());
    let port = cli_port.unwrap_or(config.server.port);

    let db_path = config.database_path(&paths);
    let store = Arc::new(RecordStore::open(&db_path)?);
    info!(db = %db_path.display(), "Record store ready");

    let app = router(AppState { store });

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(host = %host, port = port, "Starting fitdesk server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/members",
            get(handle_members_list).post(handle_member_create),
        )
        .route(
            "/members/:id",
            put(handle_member_update).delete(handle_member_delete),
        )
        .route(
            "/workout-sessions",
            get(handle_sessions_list).post(handle_session_create),
        )
        .route(
            "/workout-sessions/by-member",
            get(handle_sessions_by_member),
        )
        .route("/workout-sessions/:id", put(handle_session_update))
        .layer(CorsLayer::permissive().allow_credentials(false))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_health() -> impl IntoResponse {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    let start = START.get_or_init(std::time::Instant::now);

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": start.elapsed().as_secs(),
    }))
}

/// Map a store failure onto the wire: not-found becomes a 404, anything
/// else (constraint violations included) surfaces as a bare 500.
fn store_error(err: Error) -> Response {
    match err {
        Error::NotFound(msg) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

fn validation_error(errors: fitdesk_schema::FieldErrors) -> Response {
    (StatusCode::BAD_REQUEST, Json(errors)).into_response()
}

/// GET /members - full member list
async fn handle_members_list(State(state): State<AppState>) -> Response {
    match state.store.list_members() {
        Ok(members) => Json(members).into_response(),
        Err(e) => store_error(e),
    }
}

/// POST /members - validate, then insert with the caller-supplied id
async fn handle_member_create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let member = match load_member(&payload) {
        Ok(member) => member,
        Err(errors) => return validation_error(errors),
    };

    match state.store.create_member(&member) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "New member added successfully" })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

/// PUT /members/:id - full-record replacement of the mutable fields. The
/// path id is authoritative; any id in the body is overridden before
/// validation.
async fn handle_member_update(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(mut payload): Json<Value>,
) -> Response {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("id".to_string(), json!(id));
    }
    let member = match load_member(&payload) {
        Ok(member) => member,
        Err(errors) => return validation_error(errors),
    };

    match state.store.update_member(id, &member.name, member.age) {
        Ok(()) => Json(json!({ "message": "Member details updated successfully" })).into_response(),
        Err(e) => store_error(e),
    }
}

/// DELETE /members/:id
async fn handle_member_delete(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    match state.store.delete_member(id) {
        Ok(()) => Json(json!({ "message": "Member removed successfully" })).into_response(),
        Err(e) => store_error(e),
    }
}

/// GET /workout-sessions - full session list
async fn handle_sessions_list(State(state): State<AppState>) -> Response {
    match state.store.list_sessions() {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => store_error(e),
    }
}

/// POST /workout-sessions - validate, then insert. The member reference is
/// left to the store; validation never looks across entities.
async fn handle_session_create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let session = match load_workout_session(&payload) {
        Ok(session) => session,
        Err(errors) => return validation_error(errors),
    };

    match state.store.create_session(&session) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "New workout session added successfully" })),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

/// PUT /workout-sessions/:id - full-record replacement, path id wins
async fn handle_session_update(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(mut payload): Json<Value>,
) -> Response {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("session_id".to_string(), json!(id));
    }
    let session = match load_workout_session(&payload) {
        Ok(session) => session,
        Err(errors) => return validation_error(errors),
    };

    match state.store.update_session(
        id,
        session.member_id,
        session.session_date,
        session.session_time.as_deref(),
        session.activity.as_deref(),
    ) {
        Ok(()) => {
            Json(json!({ "message": "Workout session details updated successfully" }))
                .into_response()
        }
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct ByMemberQuery {
    name: Option<String>,
}

/// GET /workout-sessions/by-member?name= - sessions of the first member
/// whose name matches exactly
async fn handle_sessions_by_member(
    State(state): State<AppState>,
    Query(params): Query<ByMemberQuery>,
) -> Response {
    let name = params.name.unwrap_or_default();
    match state.store.sessions_by_member_name(&name) {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => store_error(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
