use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Mount point of the interactive API explorer.
const SWAGGER_UI_PATH: &str = "/docs";
/// Route serving the raw OpenAPI document the UI is backed by.
const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";

/// Expose the OpenAPI document and the Swagger UI rendered from it.
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .into();

    ui.with_state(state)
}
