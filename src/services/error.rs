//! Shared error envelope. Every non-2xx body is
//! `{ "error": { "code", "message", "details"? } }` so clients branch on a
//! stable code instead of parsing prose.

use actix_web::HttpResponse;
use serde_json::{json, Value};

use crate::db::StoreError;

pub const CODE_NOT_FOUND: &str = "not_found";
pub const CODE_STORE_UNAVAILABLE: &str = "store_unavailable";
pub const CODE_UNEXPECTED: &str = "unexpected";

pub fn envelope(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

pub fn envelope_with_details(code: &str, message: &str, details: Value) -> Value {
    json!({ "error": { "code": code, "message": message, "details": details } })
}

/// Store failures map to 503 when the database itself is unreachable and 500
/// for anything else. Constraint errors never reach this point on the happy
/// path; one arriving here means the conflict handler could not recover.
pub fn store_error_response(err: &StoreError) -> HttpResponse {
    match err {
        StoreError::Unavailable(detail) => {
            log::error!("store unavailable: {detail}");
            HttpResponse::ServiceUnavailable().json(envelope(
                CODE_STORE_UNAVAILABLE,
                "database unavailable, try again shortly",
            ))
        }
        other => {
            log::error!("store failure: {other}");
            HttpResponse::InternalServerError()
                .json(envelope(CODE_UNEXPECTED, "unexpected store failure"))
        }
    }
}
