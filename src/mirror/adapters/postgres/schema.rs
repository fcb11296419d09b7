//! Diesel schema for the mirror tables.
//!
//! Remote identifiers are the primary keys; their unique indexes are the
//! race-safety backstop for concurrent get-or-create paths.

diesel::table! {
    /// Mirrored HIT records, one row per remote id.
    hits (remote_id) {
        /// Marketplace-assigned HIT identifier.
        #[max_length = 255]
        remote_id -> Varchar,
        /// HIT type identifier.
        #[max_length = 255]
        hit_type_id -> Nullable<Varchar>,
        /// HIT title.
        #[max_length = 255]
        title -> Nullable<Varchar>,
        /// General description shown to workers.
        description -> Nullable<Text>,
        /// Comma-separated search keywords.
        keywords -> Nullable<Text>,
        /// Mirrored marketplace status, canonical lowercase form.
        #[max_length = 50]
        status -> Nullable<Varchar>,
        /// Mirrored review status, canonical lowercase form.
        #[max_length = 50]
        review_status -> Nullable<Varchar>,
        /// Reward per assignment in thousandths of a currency unit.
        reward_thousandths -> Nullable<BigInt>,
        /// Creation timestamp reported by the marketplace.
        creation_time -> Nullable<Timestamptz>,
        /// Seconds the HIT stays available.
        lifetime_in_seconds -> Nullable<BigInt>,
        /// Seconds a worker has to complete an accepted assignment.
        assignment_duration_in_seconds -> Nullable<BigInt>,
        /// Seconds after submission until automatic approval.
        auto_approval_delay_in_seconds -> Nullable<BigInt>,
        /// Number of assignments the HIT can hand out.
        max_assignments -> Nullable<BigInt>,
        /// Requester-private annotation.
        requester_annotation -> Nullable<Text>,
        /// Count of HITs identical apart from the question.
        number_of_similar_hits -> Nullable<BigInt>,
        /// Best-effort pending-assignment counter.
        assignments_pending -> Nullable<BigInt>,
        /// Best-effort available-assignment counter.
        assignments_available -> Nullable<BigInt>,
        /// Best-effort completed-assignment counter.
        assignments_completed -> Nullable<BigInt>,
        /// Application attachment type tag.
        #[max_length = 255]
        attachment_kind -> Nullable<Varchar>,
        /// Application attachment opaque identifier.
        #[max_length = 255]
        attachment_reference -> Nullable<Varchar>,
        /// When the record was last merged from a snapshot.
        last_synced_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Mirrored assignment records, one row per remote id.
    assignments (remote_id) {
        /// Marketplace-assigned assignment identifier.
        #[max_length = 255]
        remote_id -> Varchar,
        /// Remote id of the owning HIT; fixed at creation.
        #[max_length = 255]
        hit_id -> Varchar,
        /// Mirrored marketplace status, canonical lowercase form.
        #[max_length = 50]
        status -> Nullable<Varchar>,
        /// Identifier of the worker who accepted the HIT.
        #[max_length = 255]
        worker_id -> Nullable<Varchar>,
        /// When the worker accepted the assignment.
        accept_time -> Nullable<Timestamptz>,
        /// When the worker submitted results.
        submit_time -> Nullable<Timestamptz>,
        /// When the results auto-approve.
        auto_approval_time -> Nullable<Timestamptz>,
        /// When the requester approved.
        approval_time -> Nullable<Timestamptz>,
        /// When the requester rejected.
        rejection_time -> Nullable<Timestamptz>,
        /// Completion deadline.
        deadline -> Nullable<Timestamptz>,
        /// Feedback text recorded with approve/reject.
        requester_feedback -> Nullable<Text>,
        /// When the record was last merged from a snapshot.
        last_synced_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Answer key/value records, at most one row per (assignment, key).
    answer_key_values (assignment_id, key) {
        /// Remote id of the owning assignment.
        #[max_length = 255]
        assignment_id -> Varchar,
        /// Answer key.
        #[max_length = 255]
        key -> Varchar,
        /// Answer value, stored in full.
        value -> Text,
    }
}

diesel::joinable!(assignments -> hits (hit_id));
diesel::joinable!(answer_key_values -> assignments (assignment_id));

diesel::allow_tables_to_appear_in_same_query!(hits, assignments, answer_key_values);
