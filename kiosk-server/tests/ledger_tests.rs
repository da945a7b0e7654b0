//! Check-in/check-out state machine tests, end to end through a real
//! sqlite database.

mod common;

use std::time::Duration;

use chrono::{Local, Utc};
use shared::models::Subject;

use common::{make_member, Harness};
use kiosk_server::db::repository::attendance;
use kiosk_server::AppError;

#[tokio::test]
async fn test_first_punch_opens_a_record() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let record = h.ledger.process_identifier("42").await.unwrap();

    assert_eq!(record.subject, Subject::Member(42));
    assert!(record.is_open());
    assert_eq!(record.date, Utc::now().with_timezone(&Local).date_naive());
    assert_eq!(record.days_to_expiry, Some(5));
    assert!(!record.synced);

    let open = attendance::count_open_on(&h.db.pool, &record.subject, record.date)
        .await
        .unwrap();
    assert_eq!(open, 1);
}

#[tokio::test]
async fn test_second_punch_closes_the_same_record() {
    let h = Harness::with_debounce(Duration::ZERO).await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let first = h.ledger.process_identifier("42").await.unwrap();
    let second = h.ledger.process_identifier("42").await.unwrap();

    assert_eq!(second.id, first.id);
    assert!(!second.is_open());
    let check_out = second.session.check_out().unwrap();
    assert!(check_out >= second.session.check_in());

    let open = attendance::count_open_on(&h.db.pool, &second.subject, second.date)
        .await
        .unwrap();
    assert_eq!(open, 0);
}

#[tokio::test]
async fn test_third_punch_starts_a_fresh_visit() {
    let h = Harness::with_debounce(Duration::ZERO).await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let first = h.ledger.process_identifier("42").await.unwrap();
    h.ledger.process_identifier("42").await.unwrap();
    let third = h.ledger.process_identifier("42").await.unwrap();

    assert_ne!(third.id, first.id);
    assert!(third.is_open());

    // Never more than one open record per subject per day
    let open = attendance::count_open_on(&h.db.pool, &third.subject, third.date)
        .await
        .unwrap();
    assert_eq!(open, 1);
}

#[tokio::test]
async fn test_rapid_second_punch_is_rejected() {
    let h = Harness::new().await; // production 10 s debounce
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let first = h.ledger.process_identifier("42").await.unwrap();
    let err = h.ledger.process_identifier("42").await.unwrap_err();
    assert!(matches!(err, AppError::TooSoon(_)));

    // The open record is untouched by the rejected punch
    let record = attendance::find_by_id(&h.db.pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_open());
}

#[tokio::test]
async fn test_phone_number_resolves_to_member() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let record = h.ledger.process_identifier("555-0101").await.unwrap();
    assert_eq!(record.subject, Subject::Member(42));
}

#[tokio::test]
async fn test_unknown_identifier_is_recorded_then_reported_not_found() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    let err = h.ledger.process_identifier("9999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(err.to_string().contains("9999"));

    // The visit itself survived as a visitor record
    let unsynced = attendance::find_unsynced(&h.db.pool).await.unwrap();
    assert_eq!(unsynced.len(), 1);
    assert_eq!(unsynced[0].subject, Subject::Visitor("9999".into()));
    assert_eq!(unsynced[0].days_to_expiry, None);
}

#[tokio::test]
async fn test_repeat_unknown_identifier_stays_not_found() {
    // A second scan of the same unknown id inside the debounce window
    // must not surface the debounce error; the verdict stays not-found
    // and no duplicate record appears.
    let h = Harness::new().await;

    let err = h.ledger.process_identifier("9999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = h.ledger.process_identifier("9999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let unsynced = attendance::find_unsynced(&h.db.pool).await.unwrap();
    assert_eq!(unsynced.len(), 1);
}

#[tokio::test]
async fn test_distinct_unknown_identifiers_do_not_collide() {
    let h = Harness::with_debounce(Duration::ZERO).await;

    h.ledger.process_identifier("aaa").await.unwrap_err();
    h.ledger.process_identifier("bbb").await.unwrap_err();

    let unsynced = attendance::find_unsynced(&h.db.pool).await.unwrap();
    assert_eq!(unsynced.len(), 2);
    assert!(unsynced.iter().all(|r| r.is_open()));
}

#[tokio::test]
async fn test_blank_identifier_is_rejected_without_a_record() {
    let h = Harness::new().await;

    for input in ["", "   "] {
        let err = h.ledger.process_identifier(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    let count = attendance::count_unsynced(&h.db.pool).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_check_out_makes_a_synced_record_unsynced_again() {
    let h = Harness::with_debounce(Duration::ZERO).await;
    h.seed_members(&[make_member(42, "555-0101", 5)]).await;

    h.ledger.process_identifier("42").await.unwrap();
    assert!(h.ledger.sync_unsynced().await.unwrap());
    assert_eq!(attendance::count_unsynced(&h.db.pool).await.unwrap(), 0);

    // Closing the visit mutates the row, so it must sync again
    h.ledger.process_identifier("42").await.unwrap();
    assert_eq!(attendance::count_unsynced(&h.db.pool).await.unwrap(), 1);
}
