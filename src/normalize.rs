//! Shared key normalization. The write path and every dedup lookup must hash
//! and compare through these exact functions, so they live in one place.

/// Trim and lowercase. Empty input yields an empty string.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `normalize_text` then strip every character outside `[a-z0-9]`.
/// "CS-201", "cs 201" and "CS201" all collapse to "cs201".
pub fn normalize_code(s: &str) -> String {
    normalize_text(s)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Owning-student key: normalized `name|country`, the same shape the read
/// path uses to select a student's consolidated ledger.
pub fn student_key(student_name: &str, country: &str) -> String {
    format!(
        "{}|{}",
        normalize_text(student_name),
        normalize_text(country)
    )
}
