use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Board Tally Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::boardgame::list_board_games,
        crate::routes::boardgame::search_board_games,
        crate::routes::session::create_session,
        crate::routes::session::get_session,
        crate::routes::session::get_live_session,
        crate::routes::session::get_full_session,
        crate::routes::session::activate_session,
        crate::routes::session::suspend_session,
        crate::routes::session::end_session,
        crate::routes::session::add_player,
        crate::routes::session::remove_player,
        crate::routes::session::record_outcome,
        crate::routes::session::increment_points,
        crate::routes::session::set_points,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::StoreHealth,
            crate::dto::boardgame::BoardGameView,
            crate::dto::session::PlayerInput,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::CreateSessionResponse,
            crate::dto::session::TransitionResponse,
            crate::dto::session::SessionView,
            crate::dto::session::LiveSessionView,
            crate::dto::session::FullSessionView,
            crate::dto::session::AddPlayerRequest,
            crate::dto::session::RemovePlayerRequest,
            crate::dto::session::OutcomeRequest,
            crate::dto::session::IncrementPointsRequest,
            crate::dto::session::SetPointsRequest,
            crate::dao::models::SessionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "boardgames", description = "Read-only board-game catalog"),
        (name = "sessions", description = "Scoring-session lifecycle, roster, and points operations"),
    )
)]
pub struct ApiDoc;
