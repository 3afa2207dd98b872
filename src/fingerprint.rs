//! Whole-submission fingerprinting. One deterministic digest per logical
//! submission content, shared by the write path and the dedup lookup so both
//! sides hash identically.

use sha2::{Digest, Sha256};

use crate::model::CourseLine;
use crate::normalize::{normalize_code, normalize_text};

// Field and record separators for the canonical serialization. Control
// characters cannot survive normalization, so they never collide with data.
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Hex SHA-256 over the normalized (student, country, course multiset)
/// triple. Order-independent: any permutation of an equivalent course set
/// yields a byte-identical serialization, hence an identical digest.
pub fn fingerprint(student_name: &str, country: &str, courses: &[CourseLine]) -> String {
    let mut tuples: Vec<(String, String, i64, i64)> = courses
        .iter()
        .map(|c| {
            (
                normalize_text(c.title_str()),
                normalize_code(c.code_str()),
                c.unit,
                c.score,
            )
        })
        .collect();
    tuples.sort_by(|a, b| {
        let key_a = if a.1.is_empty() { &a.0 } else { &a.1 };
        let key_b = if b.1.is_empty() { &b.0 } else { &b.1 };
        key_a
            .cmp(key_b)
            .then(a.2.cmp(&b.2))
            .then(a.3.cmp(&b.3))
    });

    let mut canonical = String::new();
    canonical.push_str(&normalize_text(student_name));
    canonical.push(FIELD_SEP);
    canonical.push_str(&normalize_text(country));
    for (title, code, unit, score) in &tuples {
        canonical.push(RECORD_SEP);
        canonical.push_str(title);
        canonical.push(FIELD_SEP);
        canonical.push_str(code);
        canonical.push(FIELD_SEP);
        canonical.push_str(&unit.to_string());
        canonical.push(FIELD_SEP);
        canonical.push_str(&score.to_string());
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
