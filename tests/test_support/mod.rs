#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use transcriptd::db::Store;
use transcriptd::model::{CourseLine, SubmissionRequest};

pub fn temp_store() -> (TempDir, Store, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("transcript.sqlite3");
    let store = Store::new(&path);
    (dir, store, path)
}

pub fn course(title: &str, code: &str, unit: i64, score: i64) -> CourseLine {
    CourseLine {
        title: (!title.is_empty()).then(|| title.to_string()),
        course_code: (!code.is_empty()).then(|| code.to_string()),
        unit,
        score,
    }
}

pub fn request(student: &str, country: &str, courses: Vec<CourseLine>) -> SubmissionRequest {
    SubmissionRequest {
        student_name: student.to_string(),
        country: country.to_string(),
        scale_legend: "A≥70→5, B≥60→4".to_string(),
        university_name: None,
        university_logo_url: None,
        courses,
    }
}
