//! Liveness probe that actually touches the database.

use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use chrono::Utc;
use serde_json::json;

use crate::db::Store;
use crate::services::error;

pub fn configure_routes() -> Scope {
    scope("/api/ping").route("", get().to(process))
}

pub async fn process(store: web::Data<Store>) -> HttpResponse {
    let probe = store.with_conn(|conn| {
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(one)
    });
    match probe {
        Ok(_) => {
            let database = store
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            HttpResponse::Ok().json(json!({
                "status": "ok",
                "database": database,
                "now": Utc::now().to_rfc3339(),
            }))
        }
        Err(e) => error::store_error_response(&e),
    }
}
