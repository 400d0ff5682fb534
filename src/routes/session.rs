use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::session::{
        AddPlayerRequest, CreateSessionRequest, CreateSessionResponse, FullSessionView,
        IncrementPointsRequest, LiveSessionView, OutcomeRequest, RemovePlayerRequest,
        SessionView, SetPointsRequest, TransitionResponse, into_refs,
    },
    error::AppError,
    ident::PlayerRef,
    services::session_service::SessionCoordinator,
    state::SharedState,
};

/// Routes handling scoring-session lifecycle, roster, and points operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/live", get(get_live_session))
        .route("/sessions/{id}/full", get(get_full_session))
        .route("/sessions/{id}/activate", post(activate_session))
        .route("/sessions/{id}/suspend", post(suspend_session))
        .route("/sessions/{id}/end", post(end_session))
        .route("/sessions/{id}/players", post(add_player))
        .route("/sessions/{id}/players", delete(remove_player))
        .route("/sessions/{id}/outcome", post(record_outcome))
        .route("/sessions/{id}/points/increment", post(increment_points))
        .route("/sessions/{id}/points", put(set_points))
}

/// Create a session in both stores.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse),
        (status = 400, description = "Invalid payload"),
        (status = 503, description = "A store is unavailable")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateSessionRequest>>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let players = into_refs(payload.players)?;
    let teams = match payload.teams {
        Some(teams) => into_refs(teams)?,
        None => players.clone(),
    };
    let id = coordinator
        .create_session(
            payload.admin_id,
            payload.board_game_id,
            players,
            payload.starting_points,
            teams,
        )
        .await?;
    Ok(Json(CreateSessionResponse { id }))
}

/// Fetch the record-store half of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session metadata", body = SessionView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let session = coordinator.get_session(id).await?;
    Ok(Json(session.into()))
}

/// Fetch the live-store half of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}/live",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Live scoreboard", body = LiveSessionView),
        (status = 404, description = "Unknown session or missing live mirror")
    )
)]
pub async fn get_live_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LiveSessionView>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let live = coordinator.get_live_session(id).await?;
    Ok(Json(live.into()))
}

/// Fetch both halves of a session, or 404 if either is missing.
#[utoipa::path(
    get,
    path = "/sessions/{id}/full",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Composite session", body = FullSessionView),
        (status = 404, description = "Unknown session or missing live mirror")
    )
)]
pub async fn get_full_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FullSessionView>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let (session, live) = coordinator.get_full_session(id).await?;
    Ok(Json(FullSessionView {
        session: session.into(),
        live: live.into(),
    }))
}

/// Move the session to `ACTIVE`.
#[utoipa::path(
    post,
    path = "/sessions/{id}/activate",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session activated", body = TransitionResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn activate_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let status = coordinator.activate(id).await?;
    Ok(Json(TransitionResponse { id, status }))
}

/// Move the session to `SUSPENDED`.
#[utoipa::path(
    post,
    path = "/sessions/{id}/suspend",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session suspended", body = TransitionResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn suspend_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let status = coordinator.suspend(id).await?;
    Ok(Json(TransitionResponse { id, status }))
}

/// Move the session to the terminal `ENDED` state.
#[utoipa::path(
    post,
    path = "/sessions/{id}/end",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session ended", body = TransitionResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn end_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let status = coordinator.end(id).await?;
    Ok(Json(TransitionResponse { id, status }))
}

/// Add a player to the roster and seed their live points.
#[utoipa::path(
    post,
    path = "/sessions/{id}/players",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = AddPlayerRequest,
    responses(
        (status = 204, description = "Player rostered"),
        (status = 400, description = "Invalid player"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AddPlayerRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let player = PlayerRef::try_from(payload.player)?;
    coordinator
        .add_player(id, player, payload.initial_points)
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Remove a player from the roster and drop their live points.
#[utoipa::path(
    delete,
    path = "/sessions/{id}/players",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = RemovePlayerRequest,
    responses(
        (status = 204, description = "Player removed (or was not rostered)"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Roster kept changing concurrently")
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RemovePlayerRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let player = PlayerRef::try_from(payload.player)?;
    coordinator.remove_player(id, player).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Record winners and losers for a decided game.
#[utoipa::path(
    post,
    path = "/sessions/{id}/outcome",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = OutcomeRequest,
    responses(
        (status = 204, description = "Outcome recorded"),
        (status = 400, description = "Outcome lists are not disjoint roster subsets"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn record_outcome(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<OutcomeRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    let winners = into_refs(payload.winners)?;
    let losers = into_refs(payload.losers)?;
    coordinator.record_outcome(id, winners, losers).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Atomically add a signed delta to one player's points.
#[utoipa::path(
    post,
    path = "/sessions/{id}/points/increment",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = IncrementPointsRequest,
    responses(
        (status = 204, description = "Points incremented"),
        (status = 400, description = "Invalid player id"),
        (status = 503, description = "Live store unavailable")
    )
)]
pub async fn increment_points(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<IncrementPointsRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    coordinator
        .increment_points(id, &payload.player_id, payload.delta)
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Overwrite one player's points with an absolute value.
#[utoipa::path(
    put,
    path = "/sessions/{id}/points",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = SetPointsRequest,
    responses(
        (status = 204, description = "Points overwritten"),
        (status = 400, description = "Invalid player id"),
        (status = 503, description = "Live store unavailable")
    )
)]
pub async fn set_points(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SetPointsRequest>>,
) -> Result<axum::http::StatusCode, AppError> {
    let coordinator = SessionCoordinator::from_state(&state).await?;
    coordinator
        .set_points(id, &payload.player_id, payload.points)
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
