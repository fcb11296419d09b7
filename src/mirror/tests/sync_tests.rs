//! Sync service tests over the in-memory adapters.

use super::support::{FixedClock, assignment_snapshot, hit_snapshot};
use crate::mirror::{
    adapters::memory::{InMemoryMarketplace, InMemoryMirrorStore},
    domain::{AssignmentId, AssignmentStatus, HitId, HitStatus},
    ports::MirrorStore,
    services::{SyncError, SyncService},
};
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestSync = SyncService<InMemoryMarketplace, InMemoryMirrorStore, FixedClock>;

struct Harness {
    marketplace: Arc<InMemoryMarketplace>,
    store: Arc<InMemoryMirrorStore>,
    sync: TestSync,
}

#[fixture]
fn harness() -> Harness {
    let marketplace = Arc::new(InMemoryMarketplace::new());
    let store = Arc::new(InMemoryMirrorStore::new());
    let sync = SyncService::new(
        Arc::clone(&marketplace),
        Arc::clone(&store),
        Arc::new(FixedClock::at_noon()),
    );
    Harness {
        marketplace,
        store,
        sync,
    }
}

fn hit_id(value: &str) -> HitId {
    HitId::new(value).expect("valid HIT id")
}

fn assignment_id(value: &str) -> AssignmentId {
    AssignmentId::new(value).expect("valid assignment id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merging_a_new_snapshot_creates_the_record(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Assignable");

    let hit = harness
        .sync
        .merge_hit_snapshot(&snapshot, false)
        .await
        .expect("merge succeeds");

    assert_eq!(hit.status(), Some(HitStatus::Assignable));
    let stored = harness
        .store
        .find_hit(&hit_id("2X7ZB"))
        .await
        .expect("lookup succeeds")
        .expect("record exists");
    assert_eq!(stored, hit);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_merges_never_duplicate_records(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Assignable");

    for _ in 0..3 {
        harness
            .sync
            .merge_hit_snapshot(&snapshot, false)
            .await
            .expect("merge succeeds");
    }

    assert_eq!(harness.store.hit_count().expect("count"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merging_with_assignments_pulls_the_remote_listing(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Reviewable");
    harness
        .marketplace
        .set_hit(snapshot.clone())
        .expect("seed HIT");
    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![
                assignment_snapshot("A1", "2X7ZB", "W1", "Submitted")
                    .with_answer("colour", "blue"),
                assignment_snapshot("A2", "2X7ZB", "W2", "Submitted"),
            ],
        )
        .expect("seed assignments");

    harness
        .sync
        .merge_hit_snapshot(&snapshot, true)
        .await
        .expect("merge succeeds");

    let assignments = harness
        .store
        .assignments_for_hit(&hit_id("2X7ZB"))
        .await
        .expect("listing succeeds");
    assert_eq!(assignments.len(), 2);

    let answers = harness
        .store
        .answers_for_assignment(&assignment_id("A1"))
        .await
        .expect("answers load");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.first().map(|a| a.value()), Some("blue"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn answer_resync_overwrites_without_duplicating(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Reviewable");
    harness
        .marketplace
        .set_hit(snapshot.clone())
        .expect("seed HIT");
    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![assignment_snapshot("A1", "2X7ZB", "W1", "Submitted").with_answer("colour", "blue")],
        )
        .expect("seed assignments");
    harness
        .sync
        .merge_hit_snapshot(&snapshot, true)
        .await
        .expect("first merge");

    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![
                assignment_snapshot("A1", "2X7ZB", "W1", "Submitted").with_answer("colour", "green"),
            ],
        )
        .expect("reseed assignments");
    harness
        .sync
        .merge_hit_snapshot(&snapshot, true)
        .await
        .expect("second merge");

    let answers = harness
        .store
        .answers_for_assignment(&assignment_id("A1"))
        .await
        .expect("answers load");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.first().map(|a| a.value()), Some("green"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_hit_fetches_current_remote_state(harness: Harness) {
    harness
        .marketplace
        .set_hit(hit_snapshot("2X7ZB", "Reviewable"))
        .expect("seed HIT");

    let hit = harness
        .sync
        .refresh_hit(&hit_id("2X7ZB"), false)
        .await
        .expect("refresh succeeds");

    assert_eq!(hit.status(), Some(HitStatus::Reviewable));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_unmirrored_assignment_fails(harness: Harness) {
    let result = harness.sync.refresh_assignment(&assignment_id("A1")).await;
    assert!(matches!(result, Err(SyncError::AssignmentNotMirrored(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_assignment_merges_siblings_from_the_same_listing(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Reviewable");
    harness
        .marketplace
        .set_hit(snapshot.clone())
        .expect("seed HIT");
    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![assignment_snapshot("A1", "2X7ZB", "W1", "Submitted")],
        )
        .expect("seed assignments");
    harness
        .sync
        .merge_hit_snapshot(&snapshot, true)
        .await
        .expect("initial merge");

    // A sibling assignment appears remotely before the refresh.
    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![
                assignment_snapshot("A1", "2X7ZB", "W1", "Approved"),
                assignment_snapshot("A2", "2X7ZB", "W2", "Submitted"),
            ],
        )
        .expect("reseed assignments");

    let refreshed = harness
        .sync
        .refresh_assignment(&assignment_id("A1"))
        .await
        .expect("refresh succeeds");
    assert_eq!(refreshed.status(), Some(AssignmentStatus::Approved));

    let sibling = harness
        .store
        .find_assignment(&assignment_id("A2"))
        .await
        .expect("lookup succeeds")
        .expect("sibling mirrored opportunistically");
    assert_eq!(sibling.status(), Some(AssignmentStatus::Submitted));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_assignment_detects_remote_disappearance(harness: Harness) {
    let snapshot = hit_snapshot("2X7ZB", "Reviewable");
    harness
        .marketplace
        .set_hit(snapshot.clone())
        .expect("seed HIT");
    harness
        .marketplace
        .set_assignments(
            &hit_id("2X7ZB"),
            vec![assignment_snapshot("A1", "2X7ZB", "W1", "Submitted")],
        )
        .expect("seed assignments");
    harness
        .sync
        .merge_hit_snapshot(&snapshot, true)
        .await
        .expect("initial merge");

    harness
        .marketplace
        .set_assignments(&hit_id("2X7ZB"), vec![])
        .expect("clear assignments");

    let result = harness.sync.refresh_assignment(&assignment_id("A1")).await;
    assert!(matches!(
        result,
        Err(SyncError::AssignmentMissingFromRemote { .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_sync_isolates_per_snapshot_failures(harness: Harness) {
    let snapshots = vec![
        hit_snapshot("GOOD1", "Assignable"),
        hit_snapshot("BAD", "NoSuchStatus"),
        hit_snapshot("GOOD2", "Reviewable"),
    ];

    let report = harness.sync.sync_batch(&snapshots, false).await;

    assert_eq!(report.merged.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_clean());
    assert_eq!(
        report.failures.first().map(|f| f.hit_id.as_str()),
        Some("BAD")
    );
    assert!(
        harness
            .store
            .find_hit(&hit_id("GOOD2"))
            .await
            .expect("lookup succeeds")
            .is_some()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_with_duplicate_ids_converges_on_the_later_snapshot(harness: Harness) {
    let snapshots = vec![
        hit_snapshot("SHARED", "Assignable"),
        hit_snapshot("OTHER", "Assignable"),
        hit_snapshot("SHARED", "Reviewable"),
    ];

    let report = harness.sync.sync_batch(&snapshots, false).await;

    assert!(report.is_clean());
    assert_eq!(harness.store.hit_count().expect("count"), 2);
    let shared = harness
        .store
        .find_hit(&hit_id("SHARED"))
        .await
        .expect("lookup succeeds")
        .expect("record exists");
    assert_eq!(shared.status(), Some(HitStatus::Reviewable));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sync_all_hits_merges_the_whole_remote_listing(harness: Harness) {
    harness
        .marketplace
        .set_hit(hit_snapshot("H1", "Assignable"))
        .expect("seed H1");
    harness
        .marketplace
        .set_hit(hit_snapshot("H2", "Reviewable"))
        .expect("seed H2");

    let report = harness
        .sync
        .sync_all_hits(false)
        .await
        .expect("listing succeeds");

    assert!(report.is_clean());
    assert_eq!(harness.store.hit_count().expect("count"), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sync_reviewable_hits_skips_other_states(harness: Harness) {
    harness
        .marketplace
        .set_hit(hit_snapshot("H1", "Assignable"))
        .expect("seed H1");
    harness
        .marketplace
        .set_hit(hit_snapshot("H2", "Reviewable"))
        .expect("seed H2");

    let report = harness
        .sync
        .sync_reviewable_hits(false)
        .await
        .expect("listing succeeds");

    assert_eq!(report.merged.len(), 1);
    assert_eq!(harness.store.hit_count().expect("count"), 1);
    assert!(
        harness
            .store
            .find_hit(&hit_id("H1"))
            .await
            .expect("lookup succeeds")
            .is_none()
    );
}
