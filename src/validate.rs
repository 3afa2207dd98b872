//! Request validation. Every rule runs over the full course list before any
//! store access; the first failing rule (in the order below) wins.

use std::collections::HashSet;

use crate::model::SubmissionRequest;
use crate::normalize::normalize_code;

pub const CODE_INVALID_INPUT: &str = "invalid_input";
pub const CODE_CONFLICT: &str = "conflict";

const LOGO_URL_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn invalid(message: &'static str) -> Self {
        Self {
            code: CODE_INVALID_INPUT,
            message,
        }
    }
}

pub fn validate(req: &SubmissionRequest) -> Result<(), ValidationError> {
    if req.student_name.trim().is_empty() {
        return Err(ValidationError::invalid("student name required"));
    }
    if req.courses.is_empty() {
        return Err(ValidationError::invalid("at least one course required"));
    }
    if req
        .courses
        .iter()
        .any(|c| c.title_str().trim().is_empty() && c.code_str().trim().is_empty())
    {
        return Err(ValidationError::invalid("course needs identity"));
    }
    if req.courses.iter().any(|c| c.unit <= 0) {
        return Err(ValidationError::invalid("unit must be > 0"));
    }
    if req.courses.iter().any(|c| c.score < 0 || c.score > 100) {
        return Err(ValidationError::invalid("score out of range"));
    }

    // In-request duplicate detection uses the raw (unaliased) dedup key;
    // lines that only alias-fold together merge later in the reconciler.
    let mut seen: HashSet<(String, i64, i64)> = HashSet::new();
    for course in &req.courses {
        let code_key = normalize_code(course.code_str());
        let dedup_key = if code_key.is_empty() {
            normalize_code(course.title_str())
        } else {
            code_key
        };
        if !seen.insert((dedup_key, course.unit, course.score)) {
            return Err(ValidationError {
                code: CODE_CONFLICT,
                message: "duplicate course in request",
            });
        }
    }

    if let Some(url) = req.university_logo_url.as_deref() {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            let scheme_ok =
                trimmed.starts_with("http://") || trimmed.starts_with("https://");
            if !scheme_ok || trimmed.len() > LOGO_URL_MAX_LEN {
                return Err(ValidationError::invalid(
                    "university logo url must be http(s) and reasonably sized",
                ));
            }
        }
    }

    Ok(())
}
