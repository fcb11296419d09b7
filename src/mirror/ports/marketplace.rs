//! Remote marketplace port for listing, fetching, and mutating HITs and
//! assignments.

use crate::mirror::domain::{AssignmentId, AssignmentSnapshot, HitId, HitSnapshot, Reward, WorkerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote marketplace operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Remote marketplace contract.
///
/// Every call is one blocking round trip against the marketplace. This layer
/// never retries: a failure propagates unmodified to the caller, who owns the
/// retry policy. Timeouts likewise belong to the implementing adapter.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Lists every HIT owned by the requester.
    async fn list_hits(&self) -> MarketplaceResult<Vec<HitSnapshot>>;

    /// Lists only HITs currently in the `Reviewable` state.
    async fn list_reviewable_hits(&self) -> MarketplaceResult<Vec<HitSnapshot>>;

    /// Fetches a single HIT by remote id.
    async fn get_hit(&self, hit_id: &HitId) -> MarketplaceResult<HitSnapshot>;

    /// Lists every assignment submitted against a HIT.
    async fn assignments_for_hit(
        &self,
        hit_id: &HitId,
    ) -> MarketplaceResult<Vec<AssignmentSnapshot>>;

    /// Permanently removes a HIT's data from the marketplace.
    async fn dispose_hit(&self, hit_id: &HitId) -> MarketplaceResult<()>;

    /// Expires a HIT immediately, as if its lifetime had elapsed.
    async fn expire_hit(&self, hit_id: &HitId) -> MarketplaceResult<()>;

    /// Raises the maximum assignment count and/or extends the expiration.
    async fn extend_hit(
        &self,
        hit_id: &HitId,
        assignments_increment: Option<u32>,
        expiration_increment_in_seconds: Option<u32>,
    ) -> MarketplaceResult<()>;

    /// Toggles a HIT between `Reviewable` and `Reviewing`.
    ///
    /// With `revert` set, a `Reviewing` HIT goes back to `Reviewable`. The
    /// marketplace enforces the legality of the transition.
    async fn set_reviewing(&self, hit_id: &HitId, revert: bool) -> MarketplaceResult<()>;

    /// Approves a submitted assignment, optionally with feedback for the
    /// worker.
    async fn approve_assignment(
        &self,
        assignment_id: &AssignmentId,
        feedback: Option<&str>,
    ) -> MarketplaceResult<()>;

    /// Rejects a submitted assignment, optionally with feedback for the
    /// worker.
    async fn reject_assignment(
        &self,
        assignment_id: &AssignmentId,
        feedback: Option<&str>,
    ) -> MarketplaceResult<()>;

    /// Grants a bonus to the worker who completed an assignment.
    async fn grant_bonus(
        &self,
        worker_id: &WorkerId,
        assignment_id: &AssignmentId,
        amount: Reward,
        feedback: Option<&str>,
    ) -> MarketplaceResult<()>;
}

/// Errors returned by marketplace client adapters.
#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    /// The marketplace understood the request and refused it.
    #[error("marketplace rejected {operation}: {message}")]
    Rejected {
        /// Name of the refused operation.
        operation: &'static str,
        /// Marketplace-side failure message.
        message: String,
    },

    /// The request never completed (network, auth, serialization).
    #[error("marketplace transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MarketplaceError {
    /// Wraps a transport-level error from the client adapter.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
