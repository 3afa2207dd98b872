use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::{AppConfig, DuplicatePolicy};
use crate::db::Store;
use crate::model::SubmissionRequest;
use crate::reconcile;
use crate::services::error;
use crate::validate::{validate, CODE_CONFLICT};

pub async fn process(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    payload: web::Json<SubmissionRequest>,
) -> HttpResponse {
    if let Err(e) = validate(&payload) {
        let body = error::envelope(e.code, e.message);
        return if e.code == CODE_CONFLICT {
            HttpResponse::Conflict().json(body)
        } else {
            HttpResponse::BadRequest().json(body)
        };
    }

    match reconcile::submit(&store, &payload) {
        Ok(outcome) if outcome.deduplicated => match config.duplicate_policy {
            DuplicatePolicy::ReturnExisting => HttpResponse::Ok().json(outcome),
            DuplicatePolicy::Conflict => HttpResponse::Conflict().json(
                error::envelope_with_details(
                    CODE_CONFLICT,
                    "identical submission already recorded",
                    json!({ "id": outcome.submission.id }),
                ),
            ),
        },
        Ok(outcome) => HttpResponse::Created().json(outcome),
        Err(e) => error::store_error_response(&e),
    }
}
