//! Read-only access to the board-game catalog.

use crate::{dao::models::BoardGameEntity, error::ServiceError, state::SharedState};

/// Full catalog, in store order.
pub async fn list_board_games(state: &SharedState) -> Result<Vec<BoardGameEntity>, ServiceError> {
    let store = state.require_record_store().await?;
    Ok(store.list_board_games().await?)
}

/// Catalog entries whose name starts with `prefix`. Case-sensitive, matching
/// how the catalog names are indexed.
pub async fn search_board_games(
    state: &SharedState,
    prefix: &str,
) -> Result<Vec<BoardGameEntity>, ServiceError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(ServiceError::InvalidInput(
            "search prefix must not be empty".into(),
        ));
    }
    let store = state.require_record_store().await?;
    Ok(store.find_board_games_by_name(prefix.to_owned()).await?)
}
