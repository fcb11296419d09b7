//! Domain-level tests: identifier validation, wire mappings, and the
//! snapshot merge rules.

use super::support::{CREATION_TIME, FixedClock, assignment_snapshot, hit_snapshot};
use crate::mirror::domain::{
    AnswerKeyValue, Assignment, AssignmentId, AssignmentStatus, Attachment, Hit, HitId,
    HitReviewStatus, HitStatus, MirrorDomainError, Reward, WorkerId, parse_marketplace_timestamp,
};
use rstest::rstest;

fn hit_id(value: &str) -> HitId {
    HitId::new(value).expect("valid HIT id")
}

fn assignment_id(value: &str) -> AssignmentId {
    AssignmentId::new(value).expect("valid assignment id")
}

#[rstest]
#[case("")]
#[case("   ")]
fn remote_ids_reject_blank_values(#[case] raw: &str) {
    assert!(matches!(
        HitId::new(raw),
        Err(MirrorDomainError::EmptyIdentifier { field: "HIT id" })
    ));
    assert!(matches!(
        AssignmentId::new(raw),
        Err(MirrorDomainError::EmptyIdentifier { .. })
    ));
    assert!(matches!(
        WorkerId::new(raw),
        Err(MirrorDomainError::EmptyIdentifier { .. })
    ));
}

#[rstest]
fn remote_ids_trim_surrounding_whitespace() {
    let id = HitId::new("  2X7ZB  ").expect("valid id");
    assert_eq!(id.as_str(), "2X7ZB");
}

#[rstest]
#[case("Assignable", HitStatus::Assignable)]
#[case("Unassignable", HitStatus::Unassignable)]
#[case("Reviewable", HitStatus::Reviewable)]
#[case("Reviewing", HitStatus::Reviewing)]
#[case("Disposed", HitStatus::Disposed)]
fn hit_status_maps_wire_strings(#[case] wire: &str, #[case] expected: HitStatus) {
    assert_eq!(HitStatus::from_wire(wire).expect("known status"), expected);
    // Storage form round-trips through the canonical lowercase string.
    assert_eq!(
        HitStatus::try_from(expected.as_str()).expect("storage round trip"),
        expected
    );
}

#[rstest]
fn hit_status_rejects_unknown_and_wrong_case_wire_values() {
    assert!(matches!(
        HitStatus::from_wire("assignable"),
        Err(MirrorDomainError::UnknownHitStatus(value)) if value == "assignable"
    ));
    assert!(HitStatus::from_wire("Expired").is_err());
}

#[rstest]
fn review_status_maps_wire_strings() {
    assert_eq!(
        HitReviewStatus::from_wire("MarkedForReview").expect("known status"),
        HitReviewStatus::MarkedForReview
    );
    assert!(HitReviewStatus::from_wire("Reviewed").is_err());
}

#[rstest]
#[case(AssignmentStatus::Submitted, false)]
#[case(AssignmentStatus::Approved, true)]
#[case(AssignmentStatus::Rejected, true)]
fn assignment_status_resolution(#[case] status: AssignmentStatus, #[case] resolved: bool) {
    assert_eq!(status.is_resolved(), resolved);
}

#[rstest]
#[case("0.05", 50)]
#[case("0.050", 50)]
#[case("0.005", 5)]
#[case("1.25", 1250)]
#[case("12", 12_000)]
#[case("0", 0)]
fn reward_parses_wire_decimals(#[case] wire: &str, #[case] thousandths: u64) {
    let reward = Reward::from_wire(wire).expect("valid amount");
    assert_eq!(reward.thousandths(), thousandths);
}

#[rstest]
#[case("0.0001")]
#[case("-0.05")]
#[case("five cents")]
#[case(".5")]
#[case("")]
fn reward_rejects_malformed_wire_values(#[case] wire: &str) {
    assert!(matches!(
        Reward::from_wire(wire),
        Err(MirrorDomainError::MalformedAmount(_))
    ));
}

#[rstest]
fn reward_formats_three_fraction_digits() {
    assert_eq!(Reward::from_thousandths(50).to_wire(), "0.050");
    assert_eq!(Reward::from_thousandths(1250).to_wire(), "1.250");
    assert_eq!(Reward::from_thousandths(0).to_wire(), "0.000");
}

#[rstest]
fn timestamps_parse_the_marketplace_format_only() {
    let parsed = parse_marketplace_timestamp("2011-06-01T08:30:00Z").expect("valid timestamp");
    assert_eq!(parsed.timestamp(), 1_306_917_000);
    assert!(parse_marketplace_timestamp("2011-06-01 08:30:00").is_err());
    assert!(parse_marketplace_timestamp("not a time").is_err());
}

#[rstest]
fn merge_populates_an_empty_hit_record() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));
    let snapshot = hit_snapshot("2X7ZB", "Assignable");

    hit.merge_snapshot(&snapshot, &clock).expect("clean merge");

    assert_eq!(hit.status(), Some(HitStatus::Assignable));
    assert_eq!(hit.reward(), Some(Reward::from_thousandths(250)));
    assert_eq!(hit.title(), Some("Label a photograph"));
    assert_eq!(hit.max_assignments(), Some(3));
    assert_eq!(hit.last_synced_at(), Some(clock.0));
    assert_eq!(
        hit.creation_time().map(|t| t.timestamp()),
        parse_marketplace_timestamp(CREATION_TIME)
            .ok()
            .map(|t| t.timestamp())
    );
}

#[rstest]
fn merging_the_same_snapshot_twice_converges() {
    let clock = FixedClock::at_noon();
    let snapshot = hit_snapshot("2X7ZB", "Reviewable").with_assignment_counts(0, 1, 2);

    let mut once = Hit::new(hit_id("2X7ZB"));
    once.merge_snapshot(&snapshot, &clock).expect("first merge");
    let mut twice = once.clone();
    twice.merge_snapshot(&snapshot, &clock).expect("second merge");

    assert_eq!(once, twice);
}

#[rstest]
fn merge_rejects_a_snapshot_for_another_hit() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));
    let result = hit.merge_snapshot(&hit_snapshot("OTHER", "Assignable"), &clock);

    assert!(matches!(
        result,
        Err(MirrorDomainError::SnapshotIdMismatch { .. })
    ));
    assert_eq!(hit.status(), None);
}

#[rstest]
fn malformed_snapshot_leaves_the_record_untouched() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));
    hit.merge_snapshot(&hit_snapshot("2X7ZB", "Assignable"), &clock)
        .expect("clean merge");
    let before = hit.clone();

    let mut bad_amount = hit_snapshot("2X7ZB", "Reviewable");
    bad_amount.amount = "free".to_owned();
    assert!(hit.merge_snapshot(&bad_amount, &clock).is_err());
    assert_eq!(hit, before, "partial write after a malformed amount");

    let bad_status = hit_snapshot("2X7ZB", "Vanished");
    assert!(hit.merge_snapshot(&bad_status, &clock).is_err());
    assert_eq!(hit, before, "partial write after an unknown status");
}

#[rstest]
fn absent_counters_keep_previously_mirrored_values() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));

    let detailed = hit_snapshot("2X7ZB", "Assignable")
        .with_assignment_counts(1, 2, 0)
        .with_lifetime(86_400)
        .with_review_status("NotReviewed");
    hit.merge_snapshot(&detailed, &clock).expect("first merge");

    // Listing-shaped snapshot: same HIT, counters and review status omitted.
    let listing = hit_snapshot("2X7ZB", "Unassignable");
    hit.merge_snapshot(&listing, &clock).expect("second merge");

    assert_eq!(hit.status(), Some(HitStatus::Unassignable));
    assert_eq!(hit.assignments_pending(), Some(1));
    assert_eq!(hit.assignments_available(), Some(2));
    assert_eq!(hit.assignments_completed(), Some(0));
    assert_eq!(hit.lifetime_in_seconds(), Some(86_400));
    assert_eq!(hit.review_status(), Some(HitReviewStatus::NotReviewed));
}

#[rstest]
fn present_counters_overwrite_previously_mirrored_values() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));
    hit.merge_snapshot(
        &hit_snapshot("2X7ZB", "Assignable").with_assignment_counts(1, 2, 0),
        &clock,
    )
    .expect("first merge");
    hit.merge_snapshot(
        &hit_snapshot("2X7ZB", "Reviewable").with_assignment_counts(0, 0, 3),
        &clock,
    )
    .expect("second merge");

    assert_eq!(hit.assignments_pending(), Some(0));
    assert_eq!(hit.assignments_completed(), Some(3));
}

#[rstest]
fn attachments_are_application_state_and_survive_merges() {
    let clock = FixedClock::at_noon();
    let mut hit = Hit::new(hit_id("2X7ZB"));
    hit.attach(Attachment::new("photo_batch", "42"));

    hit.merge_snapshot(&hit_snapshot("2X7ZB", "Assignable"), &clock)
        .expect("clean merge");
    assert_eq!(hit.attachment(), Some(&Attachment::new("photo_batch", "42")));

    hit.clear_attachment();
    assert_eq!(hit.attachment(), None);
}

#[rstest]
fn assignment_merge_rejects_a_snapshot_owned_by_another_hit() {
    let clock = FixedClock::at_noon();
    let mut assignment = Assignment::new(assignment_id("A1"), hit_id("2X7ZB"));
    let snapshot = assignment_snapshot("A1", "OTHER", "W9", "Submitted");

    assert!(matches!(
        assignment.merge_snapshot(&snapshot, &clock),
        Err(MirrorDomainError::SnapshotHitMismatch { .. })
    ));
    assert_eq!(assignment.status(), None);
}

#[rstest]
fn assignment_merge_keeps_absent_resolution_timestamps() {
    let clock = FixedClock::at_noon();
    let mut assignment = Assignment::new(assignment_id("A1"), hit_id("2X7ZB"));

    let approved = assignment_snapshot("A1", "2X7ZB", "W9", "Approved")
        .with_approval_time("2011-06-11T10:00:00Z");
    assignment
        .merge_snapshot(&approved, &clock)
        .expect("first merge");
    let approval_time = assignment.approval_time();
    assert!(approval_time.is_some());

    // A later listing omits the approval time; the mirrored value stays.
    let listing = assignment_snapshot("A1", "2X7ZB", "W9", "Approved");
    assignment
        .merge_snapshot(&listing, &clock)
        .expect("second merge");
    assert_eq!(assignment.approval_time(), approval_time);
}

#[rstest]
fn assignment_merge_populates_worker_and_timestamps() {
    let clock = FixedClock::at_noon();
    let mut assignment = Assignment::new(assignment_id("A1"), hit_id("2X7ZB"));
    assignment
        .merge_snapshot(
            &assignment_snapshot("A1", "2X7ZB", "W9", "Submitted"),
            &clock,
        )
        .expect("clean merge");

    assert_eq!(assignment.status(), Some(AssignmentStatus::Submitted));
    assert_eq!(assignment.worker_id().map(WorkerId::as_str), Some("W9"));
    assert!(assignment.accept_time().is_some());
    assert!(assignment.submit_time().is_some());
    assert!(!assignment.is_resolved());
    assert_eq!(assignment.last_synced_at(), Some(clock.0));
}

#[rstest]
fn answer_update_reports_whether_the_value_changed() {
    let mut answer = AnswerKeyValue::new(assignment_id("A1"), "colour");
    assert!(answer.update_value("blue"));
    assert!(!answer.update_value("blue"));
    assert!(answer.update_value("green"));
    assert_eq!(answer.value(), "green");
}

#[rstest]
fn answer_short_value_truncates_long_text() {
    let mut answer = AnswerKeyValue::new(assignment_id("A1"), "essay");
    let long = "x".repeat(300);
    assert!(answer.update_value(&long));
    let short = answer.short_value();
    assert!(short.ends_with("..."));
    assert_eq!(short.chars().count(), 255 + 3);
    assert_eq!(answer.value().len(), 300, "full value stays intact");
}
