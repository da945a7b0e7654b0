//! Member directory tests: full-replace refresh and identifier
//! resolution.

mod common;

use std::sync::atomic::Ordering;

use common::{make_member, Harness};
use kiosk_server::db::repository::sync_state;

#[tokio::test]
async fn test_refresh_replaces_the_whole_member_set() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(1, "555-0001", 10), make_member(2, "555-0002", 20)])
        .await;

    // Member 1 left the club, member 2 changed phone, member 3 joined
    let mut updated = make_member(2, "555-9999", 20);
    updated.first_name = "Renamed".into();
    h.remote
        .set_members(vec![updated, make_member(3, "555-0003", 30)])
        .await;

    let fetched = h.directory.refresh().await.unwrap();
    assert_eq!(fetched.len(), 2);

    let local = h.directory.list().await.unwrap();
    let ids: Vec<i64> = local.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2, 3]);

    assert!(h.directory.get_by_id(1).await.unwrap().is_none());
    let two = h.directory.get_by_id(2).await.unwrap().unwrap();
    assert_eq!(two.first_name, "Renamed");
    assert_eq!(two.phone, "555-9999");

    // The stale phone no longer resolves; the new one does
    assert!(h
        .directory
        .resolve_identifier("555-0002")
        .await
        .unwrap()
        .is_none());
    let by_phone = h
        .directory
        .resolve_identifier("555-9999")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_phone.id, 2);
}

#[tokio::test]
async fn test_failed_refresh_leaves_local_data_untouched() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(1, "555-0001", 10)]).await;

    h.remote.fail_fetch.store(true, Ordering::SeqCst);
    assert!(h.directory.refresh().await.is_err());

    assert_eq!(h.directory.member_count().await.unwrap(), 1);
    let cursor = sync_state::get_or_create(&h.db.pool).await.unwrap();
    assert!(cursor.last_member_sync_time.is_none());
}

#[tokio::test]
async fn test_successful_refresh_advances_the_member_cursor() {
    let h = Harness::new().await;
    h.remote.set_members(vec![make_member(1, "555-0001", 10)]).await;

    h.directory.refresh().await.unwrap();

    let cursor = sync_state::get_or_create(&h.db.pool).await.unwrap();
    assert!(cursor.last_member_sync_time.is_some());
}

#[tokio::test]
async fn test_refresh_to_an_empty_roster_clears_the_directory() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(1, "555-0001", 10)]).await;
    h.remote.set_members(Vec::new()).await;

    h.directory.refresh().await.unwrap();
    assert_eq!(h.directory.member_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_id_match_wins_over_phone_match() {
    let h = Harness::new().await;
    // Member 42's phone is literally "7", member 7 exists too
    h.seed_members(&[make_member(7, "555-0007", 10), make_member(42, "7", 10)])
        .await;

    let resolved = h.directory.resolve_identifier("7").await.unwrap().unwrap();
    assert_eq!(resolved.id, 7);
}

#[tokio::test]
async fn test_unknown_identifier_resolves_to_none() {
    let h = Harness::new().await;
    h.seed_members(&[make_member(1, "555-0001", 10)]).await;

    assert!(h
        .directory
        .resolve_identifier("does-not-exist")
        .await
        .unwrap()
        .is_none());
}
