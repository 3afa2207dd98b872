use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::db::Store;
use crate::model::{LedgerEntry, SubmissionRecord};
use crate::reconcile;
use crate::services::error;
use crate::validate::CODE_INVALID_INPUT;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionView {
    #[serde(flatten)]
    submission: SubmissionRecord,
    courses: Vec<LedgerEntry>,
}

pub async fn process(store: web::Data<Store>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    if Uuid::parse_str(&id).is_err() {
        return HttpResponse::BadRequest()
            .json(error::envelope(CODE_INVALID_INPUT, "invalid submission id"));
    }

    match reconcile::get_submission(&store, &id) {
        Ok(Some((submission, courses))) => HttpResponse::Ok().json(SubmissionView {
            submission,
            courses,
        }),
        Ok(None) => HttpResponse::NotFound()
            .json(error::envelope(error::CODE_NOT_FOUND, "submission not found")),
        Err(e) => error::store_error_response(&e),
    }
}
