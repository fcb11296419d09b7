//! Unit tests for the mirror module.
//!
//! Tests are organised by layer: domain merge rules, sync orchestration over
//! the in-memory adapters, and lifecycle preconditions with mocked remote
//! clients.

mod domain_tests;
mod sync_tests;

pub(crate) mod support {
    //! Shared fixtures: a pinned clock and canned wire snapshots.

    use crate::mirror::domain::{AssignmentSnapshot, HitSnapshot};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock pinned to a fixed instant so merges are byte-for-byte
    /// deterministic.
    pub struct FixedClock(pub DateTime<Utc>);

    impl FixedClock {
        pub fn at_noon() -> Self {
            Self(
                Utc.with_ymd_and_hms(2011, 6, 14, 12, 0, 0)
                    .single()
                    .expect("valid fixture instant"),
            )
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    pub const CREATION_TIME: &str = "2011-06-01T08:30:00Z";
    pub const ACCEPT_TIME: &str = "2011-06-10T09:00:00Z";
    pub const SUBMIT_TIME: &str = "2011-06-10T09:20:00Z";
    pub const AUTO_APPROVAL_TIME: &str = "2011-06-17T09:20:00Z";

    pub fn hit_snapshot(hit_id: &str, status: &str) -> HitSnapshot {
        HitSnapshot::new(hit_id, status, "0.25", CREATION_TIME)
            .with_hit_type_id("T100")
            .with_title("Label a photograph")
            .with_description("Pick the best label for the photograph")
            .with_keywords("image, labelling")
            .with_durations(3600, 604_800)
            .with_max_assignments(3)
    }

    pub fn assignment_snapshot(
        assignment_id: &str,
        hit_id: &str,
        worker_id: &str,
        status: &str,
    ) -> AssignmentSnapshot {
        AssignmentSnapshot::new(
            assignment_id,
            hit_id,
            worker_id,
            status,
            ACCEPT_TIME,
            SUBMIT_TIME,
            AUTO_APPROVAL_TIME,
        )
    }
}
