//! Prints the board-tally-back OpenAPI document to stdout, for committing
//! generated API specs or feeding client generators.

use board_tally_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!(
        "{}",
        doc.to_pretty_json().expect("OpenAPI document serializes")
    );
}
