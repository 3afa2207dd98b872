mod test_support;

use test_support::{course, request, temp_store};
use transcriptd::reconcile;

#[test]
fn resubmitting_identical_content_returns_the_same_record() {
    let (_dir, store, _path) = temp_store();
    let req = request(
        "Ada Lovelace",
        "nigeria",
        vec![
            course("Algebra", "MTH101", 3, 70),
            course("Biology", "BIO101", 2, 58),
        ],
    );

    let first = reconcile::submit(&store, &req).expect("first submit");
    assert!(!first.deduplicated);
    assert_eq!(first.added.len(), 2);
    assert!(first.updated.is_empty());

    let second = reconcile::submit(&store, &req).expect("second submit");
    assert!(second.deduplicated);
    assert_eq!(second.submission.id, first.submission.id);
    assert_eq!(second.submission.created_at, first.submission.created_at);
    assert!(second.added.is_empty());
    assert!(second.updated.is_empty());
    assert_eq!(second.courses, first.courses);
}

#[test]
fn course_order_and_field_casing_do_not_defeat_dedup() {
    let (_dir, store, _path) = temp_store();
    let forward = request(
        "Ada Lovelace",
        "nigeria",
        vec![
            course("Algebra", "MTH101", 3, 70),
            course("Biology", "BIO101", 2, 58),
        ],
    );
    let shuffled = request(
        "  ADA lovelace ",
        "Nigeria",
        vec![
            course("biology", "bio-101", 2, 58),
            course(" ALGEBRA ", "mth 101", 3, 70),
        ],
    );

    let first = reconcile::submit(&store, &forward).expect("first submit");
    let second = reconcile::submit(&store, &shuffled).expect("shuffled resubmit");
    assert!(second.deduplicated);
    assert_eq!(second.submission.id, first.submission.id);
}

#[test]
fn duplicate_submit_writes_nothing() {
    let (_dir, store, path) = temp_store();
    let req = request("Ada", "nigeria", vec![course("Algebra", "MTH101", 3, 70)]);
    reconcile::submit(&store, &req).expect("first submit");
    reconcile::submit(&store, &req).expect("duplicate submit");

    let conn = transcriptd::db::open_db(&path).expect("inspect db");
    let submissions: i64 = conn
        .query_row("SELECT COUNT(*) FROM submissions", [], |r| r.get(0))
        .expect("count submissions");
    let ledger: i64 = conn
        .query_row("SELECT COUNT(*) FROM course_ledger", [], |r| r.get(0))
        .expect("count ledger");
    assert_eq!(submissions, 1);
    assert_eq!(ledger, 1);
}

#[test]
fn changed_score_is_a_new_submission_not_a_duplicate() {
    let (_dir, store, _path) = temp_store();
    let first = reconcile::submit(
        &store,
        &request("Ada", "nigeria", vec![course("Algebra", "MTH101", 3, 70)]),
    )
    .expect("first submit");
    let second = reconcile::submit(
        &store,
        &request("Ada", "nigeria", vec![course("Algebra", "MTH101", 3, 75)]),
    )
    .expect("revised submit");

    assert!(!second.deduplicated);
    assert_ne!(second.submission.id, first.submission.id);
    assert_eq!(second.updated.len(), 1);
    assert_eq!(second.updated[0].old_score, 70);
    assert_eq!(second.updated[0].score, 75);
}
