//! Wire and domain types for submissions and the per-student course ledger.
//! Field names follow the browser payload (camelCase).

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub student_name: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub scale_legend: String,
    #[serde(default)]
    pub university_name: Option<String>,
    #[serde(default)]
    pub university_logo_url: Option<String>,
    #[serde(default)]
    pub courses: Vec<CourseLine>,
}

fn default_country() -> String {
    "nigeria".to_string()
}

/// One course as submitted. Unit and score arrive as whatever the form
/// produced; anything non-numeric coerces to 0 and is then rejected by
/// validation, never silently after it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLine {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub unit: i64,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub score: i64,
}

impl CourseLine {
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn code_str(&self) -> &str {
        self.course_code.as_deref().unwrap_or("")
    }
}

fn int_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_int(&value))
}

fn coerce_int(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// The immutable submission row as persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub student_name: String,
    pub country: String,
    pub scale_legend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_logo_url: Option<String>,
    pub created_at: String,
}

/// Current standing of one course for one student, independent of which
/// submission last touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub title: String,
    pub course_code: String,
    pub unit: i64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedCourse {
    pub title: String,
    pub course_code: String,
    pub unit: i64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCourse {
    pub title: String,
    pub course_code: String,
    pub unit: i64,
    pub score: i64,
    pub old_title: String,
    pub old_course_code: String,
    pub old_unit: i64,
    pub old_score: i64,
}

/// Result of one accepted submit call, duplicate or not.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    #[serde(flatten)]
    pub submission: SubmissionRecord,
    pub deduplicated: bool,
    pub courses: Vec<LedgerEntry>,
    pub added: Vec<AddedCourse>,
    pub updated: Vec<UpdatedCourse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_line_coerces_loose_numerics() {
        let line: CourseLine = serde_json::from_str(
            r#"{ "title": "Algebra", "unit": "3", "score": 72.9 }"#,
        )
        .expect("parse");
        assert_eq!(line.unit, 3);
        assert_eq!(line.score, 72);
        assert_eq!(line.code_str(), "");
    }

    #[test]
    fn missing_unit_and_score_default_to_zero() {
        let line: CourseLine =
            serde_json::from_str(r#"{ "courseCode": "CS-201" }"#).expect("parse");
        assert_eq!(line.unit, 0);
        assert_eq!(line.score, 0);
        assert!(line.title.is_none());
    }

    #[test]
    fn garbage_numerics_become_zero_not_errors() {
        let line: CourseLine = serde_json::from_str(
            r#"{ "title": "X", "unit": "lots", "score": null }"#,
        )
        .expect("parse");
        assert_eq!(line.unit, 0);
        assert_eq!(line.score, 0);
    }

    #[test]
    fn request_defaults_country() {
        let req: SubmissionRequest =
            serde_json::from_str(r#"{ "studentName": "Ada", "courses": [] }"#).expect("parse");
        assert_eq!(req.country, "nigeria");
        assert!(req.courses.is_empty());
    }
}
