//! End-to-end mirror flow against the in-memory adapters: list, sync,
//! review, rule, reward, dispose.

use hitsync::mirror::{
    adapters::memory::{InMemoryMarketplace, InMemoryMirrorStore},
    domain::{
        AssignmentId, AssignmentSnapshot, AssignmentStatus, HitId, HitSnapshot, HitStatus, Reward,
    },
    ports::MirrorStore,
    services::LifecycleService,
};
use mockable::DefaultClock;
use std::sync::Arc;

const CREATION_TIME: &str = "2011-06-01T08:30:00Z";

fn hit_id(value: &str) -> HitId {
    HitId::new(value).expect("valid HIT id")
}

fn assignment_id(value: &str) -> AssignmentId {
    AssignmentId::new(value).expect("valid assignment id")
}

fn published_hit(id: &str) -> HitSnapshot {
    HitSnapshot::new(id, "Assignable", "0.10", CREATION_TIME)
        .with_title("Transcribe a receipt")
        .with_durations(1800, 259_200)
        .with_max_assignments(2)
}

fn submitted_assignment(id: &str, hit: &str, worker: &str) -> AssignmentSnapshot {
    AssignmentSnapshot::new(
        id,
        hit,
        worker,
        "Submitted",
        "2011-06-10T09:00:00Z",
        "2011-06-10T09:25:00Z",
        "2011-06-17T09:25:00Z",
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn full_review_cycle_converges_in_the_mirror() {
    let marketplace = Arc::new(InMemoryMarketplace::new());
    let store = Arc::new(InMemoryMirrorStore::new());
    let lifecycle = LifecycleService::new(
        Arc::clone(&marketplace),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );

    marketplace
        .set_hit(published_hit("H1"))
        .expect("publish H1");
    marketplace
        .set_hit(published_hit("H2"))
        .expect("publish H2");
    marketplace
        .set_assignments(
            &hit_id("H1"),
            vec![
                submitted_assignment("A1", "H1", "W1").with_answer("total", "12.40"),
                submitted_assignment("A2", "H1", "W2").with_answer("total", "12.40"),
            ],
        )
        .expect("seed H1 listing");
    marketplace
        .set_assignments(&hit_id("H2"), vec![])
        .expect("seed H2 listing");

    let report = lifecycle
        .sync()
        .sync_all_hits(true)
        .await
        .expect("initial sync");
    assert!(report.is_clean());
    assert_eq!(report.merged.len(), 2);

    // Close the HIT out for review.
    let expired = lifecycle.expire_hit(&hit_id("H1")).await.expect("expire");
    assert_eq!(expired.status(), Some(HitStatus::Reviewable));
    let reviewing = lifecycle
        .set_reviewing(&hit_id("H1"), false)
        .await
        .expect("park for review");
    assert_eq!(reviewing.status(), Some(HitStatus::Reviewing));
    lifecycle
        .set_reviewing(&hit_id("H1"), true)
        .await
        .expect("release from review");

    // Rule on both submissions.
    let approved = lifecycle
        .approve_assignment(&assignment_id("A1"), Some("accurate"))
        .await
        .expect("approve A1");
    assert_eq!(approved.status(), Some(AssignmentStatus::Approved));
    let rejected = lifecycle
        .reject_assignment(&assignment_id("A2"), Some("duplicate entry"))
        .await
        .expect("reject A2");
    assert_eq!(rejected.status(), Some(AssignmentStatus::Rejected));

    // Reward the approved worker.
    lifecycle
        .grant_bonus(&assignment_id("A1"), Reward::from_thousandths(250), None)
        .await
        .expect("grant bonus");
    let grants = marketplace.granted_bonuses().expect("grant log");
    assert_eq!(grants.len(), 1);

    // Every assignment is resolved, so the dispose preconditions hold.
    let disposed = lifecycle
        .dispose_hit(&hit_id("H1"))
        .await
        .expect("dispose H1");
    assert!(disposed.is_disposed());

    // The mirror keeps the full record as a historical cache.
    let answers = store
        .answers_for_assignment(&assignment_id("A1"))
        .await
        .expect("answers load");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.first().map(|a| a.value()), Some("12.40"));
    let assignments = store
        .assignments_for_hit(&hit_id("H1"))
        .await
        .expect("assignments load");
    assert_eq!(assignments.len(), 2);
    assert!(assignments.iter().all(hitsync::mirror::domain::Assignment::is_resolved));

    // The untouched HIT is still mirrored in its published state.
    let other = store
        .find_hit(&hit_id("H2"))
        .await
        .expect("lookup succeeds")
        .expect("H2 mirrored");
    assert_eq!(other.status(), Some(HitStatus::Assignable));
}

#[tokio::test(flavor = "multi_thread")]
async fn resync_after_remote_changes_is_idempotent() {
    let marketplace = Arc::new(InMemoryMarketplace::new());
    let store = Arc::new(InMemoryMirrorStore::new());
    let lifecycle = LifecycleService::new(
        Arc::clone(&marketplace),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );

    marketplace
        .set_hit(published_hit("H1"))
        .expect("publish H1");
    marketplace
        .set_assignments(
            &hit_id("H1"),
            vec![submitted_assignment("A1", "H1", "W1")],
        )
        .expect("seed listing");

    for _ in 0..3 {
        let report = lifecycle
            .sync()
            .sync_all_hits(true)
            .await
            .expect("repeated sync");
        assert!(report.is_clean());
    }

    assert_eq!(store.hit_count().expect("hit count"), 1);
    assert_eq!(store.assignment_count().expect("assignment count"), 1);
}
