//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the tutor API to disk, so front-end clients
//! can be generated without starting the server.
//!
//! Usage: `openapi [OUTPUT_PATH]` (defaults to `openapi.json`).

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let api_doc = ApiDoc::openapi();
    let path_count = api_doc.paths.paths.len();
    std::fs::write(&output, api_doc.to_pretty_json()?)?;

    println!(
        "OpenAPI document with {} paths written to {}",
        path_count,
        output.display()
    );
    Ok(())
}
