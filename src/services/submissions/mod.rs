//! Submission endpoints.
//!
//! - `POST /api/submissions` — validate and ingest one submission.
//! - `GET /api/submissions/{id}` — submission fields plus the owning
//!   student's consolidated course ledger.

mod create;
mod get;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/submissions";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("/{submission_id}", get().to(get::process))
}
