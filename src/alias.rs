//! Course alias resolution. The `course_aliases` table folds spelling and
//! format variants of the same course into one canonical identity before any
//! ledger lookup. A miss is not an error; the caller keeps its own key.

use rusqlite::{Connection, OptionalExtension};

use crate::db::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCourse {
    pub key: String,
    pub code: String,
    pub title: String,
}

pub fn resolve(
    conn: &Connection,
    alias_key: &str,
) -> Result<Option<CanonicalCourse>, StoreError> {
    if alias_key.is_empty() {
        return Ok(None);
    }
    let found = conn
        .query_row(
            "SELECT canonical_key, canonical_code, canonical_title
             FROM course_aliases WHERE alias_key = ?",
            [alias_key],
            |row| {
                Ok(CanonicalCourse {
                    key: row.get(0)?,
                    code: row.get(1)?,
                    title: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

/// Register (or replace) one alias mapping. The ingestion core never calls
/// this; it exists for seeding and for the alias import tooling.
pub fn put_alias(
    conn: &Connection,
    alias_key: &str,
    canonical: &CanonicalCourse,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO course_aliases(alias_key, canonical_key, canonical_code, canonical_title)
         VALUES(?, ?, ?, ?)",
        (alias_key, &canonical.key, &canonical.code, &canonical.title),
    )?;
    Ok(())
}

/// Active dedup key for a course line: an explicit code beats an inferred
/// alias, which beats the raw title key.
pub fn active_dedup_key(
    code_key: &str,
    resolved: Option<&CanonicalCourse>,
    title_key: &str,
) -> String {
    if !code_key.is_empty() {
        return code_key.to_string();
    }
    if let Some(canonical) = resolved {
        return canonical.key.clone();
    }
    title_key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db;

    fn canonical_bio() -> CanonicalCourse {
        CanonicalCourse {
            key: "bio101".into(),
            code: "BIO101".into(),
            title: "Biology 101".into(),
        }
    }

    #[test]
    fn explicit_code_beats_resolved_alias() {
        let canonical = canonical_bio();
        assert_eq!(
            active_dedup_key("cs201", Some(&canonical), "intro"),
            "cs201"
        );
        assert_eq!(active_dedup_key("", Some(&canonical), "intro"), "bio101");
        assert_eq!(active_dedup_key("", None, "intro"), "intro");
    }

    #[test]
    fn resolve_round_trips_through_the_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_db(&dir.path().join("transcript.sqlite3")).expect("open db");

        assert_eq!(resolve(&conn, "bio101").expect("miss ok"), None);
        assert_eq!(resolve(&conn, "").expect("empty key ok"), None);

        put_alias(&conn, "biology101", &canonical_bio()).expect("put");
        let hit = resolve(&conn, "biology101").expect("hit").expect("some");
        assert_eq!(hit.key, "bio101");
        assert_eq!(hit.title, "Biology 101");
    }
}
