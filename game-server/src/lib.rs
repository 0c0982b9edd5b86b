use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::identity::resolve_identity;
use crate::session_manager::{SessionManager, SessionManagerError};
use crate::websocket::ConnectionManager;
use game_types::{CreateSession, Difficulty, GameError, PlaySnapshot, SessionId, SessionState};

pub mod config;
pub mod identity;
pub mod session_manager;
pub mod websocket;

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

#[derive(Deserialize)]
struct OpenSessionsQuery {
    language_pair_id: i32,
}

#[derive(Deserialize)]
struct PracticeQuery {
    language_pair_id: i32,
    #[serde(default)]
    difficulty: Difficulty,
    /// Comma separated tense ids
    tense_ids: Option<String>,
}

#[derive(Deserialize)]
struct JoinRequest {
    language_pair_id: i32,
}

#[derive(Serialize)]
struct SessionView {
    state: SessionState,
    play: Option<PlaySnapshot>,
}

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    session_manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let session_manager_filter = warp::any().map({
        let session_manager = session_manager.clone();
        move || session_manager.clone()
    });

    let identity_headers = warp::header::optional::<String>("authorization")
        .and(warp::header::optional::<String>("x-guest-id"));

    let json_body = warp::body::content_length_limit(16 * 1024);

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .and(session_manager_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, session_mgr| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, conn_mgr, session_mgr))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_session = warp::path!("sessions")
        .and(warp::post())
        .and(identity_headers.clone())
        .and(json_body.clone().and(warp::body::json::<CreateSession>()))
        .and(session_manager_filter.clone())
        .and_then(handle_create_session);

    let open_sessions = warp::path!("sessions")
        .and(warp::get())
        .and(warp::query::<OpenSessionsQuery>())
        .and(session_manager_filter.clone())
        .and_then(handle_open_sessions);

    let session_view = warp::path!("sessions" / String)
        .and(warp::get())
        .and(identity_headers.clone())
        .and(session_manager_filter.clone())
        .and_then(handle_session_view);

    let join_session = warp::path!("sessions" / String / "join")
        .and(warp::post())
        .and(identity_headers.clone())
        .and(json_body.clone().and(warp::body::json::<JoinRequest>()))
        .and(session_manager_filter.clone())
        .and_then(handle_join_session);

    let prompts = warp::path!("sessions" / String / "prompts")
        .and(warp::get())
        .and(identity_headers.clone())
        .and(session_manager_filter.clone())
        .and_then(handle_prompts);

    let words = warp::path!("sessions" / String / "words")
        .and(warp::get())
        .and(identity_headers.clone())
        .and(session_manager_filter.clone())
        .and_then(handle_words);

    // ready, leave, end and restart
    let session_action = warp::path!("sessions" / String / String)
        .and(warp::post())
        .and(identity_headers.clone())
        .and(session_manager_filter.clone())
        .and_then(handle_session_action);

    let practice = warp::path!("prompts" / "practice")
        .and(warp::get())
        .and(warp::query::<PracticeQuery>())
        .and(session_manager_filter.clone())
        .and_then(handle_practice);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization", "x-guest-id"])
        .allow_methods(vec!["GET", "POST"]);

    websocket
        .or(health)
        .or(create_session)
        .or(open_sessions)
        .or(session_view)
        .or(join_session)
        .or(prompts)
        .or(words)
        .or(session_action)
        .or(practice)
        .with(cors)
        .with(warp::log("lingua_arena"))
}

/// HTTP status for a rejected game operation
pub fn status_for(error: &GameError) -> StatusCode {
    match error {
        GameError::SessionNotFound { .. }
        | GameError::PlayerNotFound { .. }
        | GameError::LanguagePairNotFound { .. } => StatusCode::NOT_FOUND,
        GameError::NotSessionCreator => StatusCode::FORBIDDEN,
        GameError::SessionFull { .. }
        | GameError::AlreadyJoined
        | GameError::SessionEnded
        | GameError::InvalidGameState { .. }
        | GameError::AlreadyAnswered
        | GameError::NotYourTurn => StatusCode::CONFLICT,
        GameError::LanguagePairMismatch
        | GameError::InvalidSelection
        | GameError::InvalidCard { .. }
        | GameError::InvalidConfiguration { .. } => StatusCode::BAD_REQUEST,
    }
}

fn json_reply<T: Serialize>(value: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(status: StatusCode, message: &str) -> JsonReply {
    json_reply(&serde_json::json!({ "error": message }), status)
}

fn failure_reply(failure: SessionManagerError) -> JsonReply {
    match failure {
        SessionManagerError::Game(error) => json_reply(
            &serde_json::json!({ "error": error.to_string(), "details": error }),
            status_for(&error),
        ),
        SessionManagerError::Storage(e) => {
            tracing::error!("Storage failure: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn parse_session_id(session_id: &str) -> Result<SessionId, JsonReply> {
    Uuid::parse_str(session_id)
        .map_err(|_| error_reply(StatusCode::BAD_REQUEST, "Invalid session ID format"))
}

fn caller(
    auth_header: Option<String>,
    guest_header: Option<String>,
) -> Result<game_types::Identity, JsonReply> {
    resolve_identity(auth_header, guest_header)
        .map_err(|e| error_reply(StatusCode::UNAUTHORIZED, &e.to_string()))
}

async fn handle_create_session(
    auth_header: Option<String>,
    guest_header: Option<String>,
    request: CreateSession,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let identity = match caller(auth_header, guest_header) {
        Ok(identity) => identity,
        Err(reply) => return Ok(reply),
    };

    match session_manager.create(&identity, request).await {
        Ok(state) => Ok(json_reply(&state, StatusCode::CREATED)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_open_sessions(
    query: OpenSessionsQuery,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    match session_manager.open_sessions(query.language_pair_id).await {
        Ok(sessions) => Ok(json_reply(&sessions, StatusCode::OK)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_session_view(
    session_id: String,
    auth_header: Option<String>,
    guest_header: Option<String>,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };

    let (state, play) = match session_manager.snapshot(session_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(failure_reply(e)),
    };

    // Gameplay details are for seated players only
    let is_member = resolve_identity(auth_header, guest_header)
        .is_ok_and(|identity| state.is_member(identity.id));
    let view = SessionView {
        play: if is_member { play } else { None },
        state,
    };

    Ok(json_reply(&view, StatusCode::OK))
}

async fn handle_join_session(
    session_id: String,
    auth_header: Option<String>,
    guest_header: Option<String>,
    request: JoinRequest,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let identity = match caller(auth_header, guest_header) {
        Ok(identity) => identity,
        Err(reply) => return Ok(reply),
    };

    match session_manager
        .join(session_id, &identity, request.language_pair_id)
        .await
    {
        Ok(state) => Ok(json_reply(&state, StatusCode::OK)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_session_action(
    session_id: String,
    action: String,
    auth_header: Option<String>,
    guest_header: Option<String>,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let identity = match caller(auth_header, guest_header) {
        Ok(identity) => identity,
        Err(reply) => return Ok(reply),
    };

    let result = match action.as_str() {
        "ready" => session_manager.ready(session_id, identity.id).await,
        "leave" => session_manager.leave(session_id, identity.id).await,
        "end" => session_manager.end(session_id, identity.id).await,
        "restart" => session_manager.restart(session_id, identity.id).await,
        _ => {
            return Ok(error_reply(
                StatusCode::NOT_FOUND,
                &format!("Unknown session action '{}'", action),
            ));
        }
    };

    match result {
        Ok(state) => Ok(json_reply(&state, StatusCode::OK)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_prompts(
    session_id: String,
    auth_header: Option<String>,
    guest_header: Option<String>,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let identity = match caller(auth_header, guest_header) {
        Ok(identity) => identity,
        Err(reply) => return Ok(reply),
    };

    match session_manager.prompts(session_id, identity.id).await {
        Ok(prompts) => Ok(json_reply(&prompts, StatusCode::OK)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_words(
    session_id: String,
    auth_header: Option<String>,
    guest_header: Option<String>,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return Ok(reply),
    };
    let identity = match caller(auth_header, guest_header) {
        Ok(identity) => identity,
        Err(reply) => return Ok(reply),
    };

    match session_manager.word_grid(session_id, identity.id).await {
        Ok(grid) => Ok(json_reply(&grid, StatusCode::OK)),
        Err(e) => Ok(failure_reply(e)),
    }
}

async fn handle_practice(
    query: PracticeQuery,
    session_manager: Arc<SessionManager>,
) -> Result<JsonReply, warp::Rejection> {
    let tense_ids: Vec<i32> = match query.tense_ids.as_deref() {
        Some(ids) => match ids
            .split(',')
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.trim().parse::<i32>())
            .collect::<Result<_, _>>()
        {
            Ok(ids) => ids,
            Err(_) => return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid tense_ids")),
        },
        None => Vec::new(),
    };

    match session_manager
        .practice_prompt(query.language_pair_id, query.difficulty, &tense_ids)
        .await
    {
        Ok(Some(prompt)) => Ok(json_reply(&prompt, StatusCode::OK)),
        Ok(None) => Ok(error_reply(
            StatusCode::NOT_FOUND,
            "No practice prompt available for these settings",
        )),
        Err(e) => Ok(failure_reply(e)),
    }
}
