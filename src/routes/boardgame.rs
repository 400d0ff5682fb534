use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::boardgame::BoardGameView, error::AppError, services::boardgame_service,
    state::SharedState,
};

/// Routes serving the read-only board-game catalog.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/boardgames", get(list_board_games))
        .route("/boardgames/search", get(search_board_games))
}

/// Query parameters for the catalog prefix search.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Name prefix to match.
    pub name: String,
}

/// List the whole board-game catalog.
#[utoipa::path(
    get,
    path = "/boardgames",
    tag = "boardgames",
    responses(
        (status = 200, description = "Catalog entries", body = [BoardGameView]),
        (status = 503, description = "Record store unavailable")
    )
)]
pub async fn list_board_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<BoardGameView>>, AppError> {
    let games = boardgame_service::list_board_games(&state).await?;
    Ok(Json(games.into_iter().map(BoardGameView::from).collect()))
}

/// Search the catalog by name prefix.
#[utoipa::path(
    get,
    path = "/boardgames/search",
    tag = "boardgames",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching catalog entries", body = [BoardGameView]),
        (status = 400, description = "Empty search prefix"),
        (status = 503, description = "Record store unavailable")
    )
)]
pub async fn search_board_games(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<BoardGameView>>, AppError> {
    let games = boardgame_service::search_board_games(&state, &query.name).await?;
    Ok(Json(games.into_iter().map(BoardGameView::from).collect()))
}
