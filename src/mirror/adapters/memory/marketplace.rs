//! In-memory marketplace adapter for deterministic tests and local runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::mirror::{
    domain::{
        AssignmentId, AssignmentSnapshot, HitId, HitSnapshot, Reward, WorkerId,
        format_marketplace_timestamp,
    },
    ports::{MarketplaceClient, MarketplaceError, MarketplaceResult},
};

/// One recorded bonus grant, kept for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusGrant {
    /// Worker the bonus was addressed to.
    pub worker_id: WorkerId,
    /// Assignment the bonus was granted for.
    pub assignment_id: AssignmentId,
    /// Granted amount.
    pub amount: Reward,
    /// Feedback sent along with the grant.
    pub feedback: Option<String>,
}

/// In-memory marketplace adapter.
///
/// Models marketplace behaviour without any network round trips: lifecycle
/// calls rewrite the held snapshots the way the real marketplace would
/// (dispose marks the HIT `Disposed`, approve stamps an approval time), so a
/// subsequent resync observes the post-mutation state. Suitable for tests
/// and local deterministic orchestration flows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketplace {
    state: Arc<RwLock<InMemoryMarketplaceState>>,
}

#[derive(Debug, Default)]
struct InMemoryMarketplaceState {
    hits: HashMap<String, HitSnapshot>,
    assignments: HashMap<String, Vec<AssignmentSnapshot>>,
    bonuses: Vec<BonusGrant>,
}

impl InMemoryMarketplace {
    /// Creates an empty in-memory marketplace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes or replaces a HIT snapshot.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_hit(&self, snapshot: HitSnapshot) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        state.hits.insert(snapshot.hit_id.clone(), snapshot);
        Ok(())
    }

    /// Replaces the assignment list of a HIT.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_assignments(
        &self,
        hit_id: &HitId,
        snapshots: Vec<AssignmentSnapshot>,
    ) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        state
            .assignments
            .insert(hit_id.as_str().to_owned(), snapshots);
        Ok(())
    }

    /// Returns every bonus granted so far, in grant order.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn granted_bonuses(&self) -> MarketplaceResult<Vec<BonusGrant>> {
        Ok(self.read_state()?.bonuses.clone())
    }

    fn read_state(
        &self,
    ) -> MarketplaceResult<std::sync::RwLockReadGuard<'_, InMemoryMarketplaceState>> {
        self.state
            .read()
            .map_err(|err| MarketplaceError::transport(std::io::Error::other(err.to_string())))
    }

    fn write_state(
        &self,
    ) -> MarketplaceResult<std::sync::RwLockWriteGuard<'_, InMemoryMarketplaceState>> {
        self.state
            .write()
            .map_err(|err| MarketplaceError::transport(std::io::Error::other(err.to_string())))
    }

    fn update_hit_status(
        &self,
        hit_id: &HitId,
        operation: &'static str,
        status: &str,
    ) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        let snapshot = state
            .hits
            .get_mut(hit_id.as_str())
            .ok_or_else(|| unknown_hit(operation, hit_id))?;
        status.clone_into(&mut snapshot.hit_status);
        Ok(())
    }

    fn update_assignment(
        &self,
        operation: &'static str,
        assignment_id: &AssignmentId,
        status: &str,
        stamp_approval: bool,
    ) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        let now = format_marketplace_timestamp(Utc::now());
        for snapshots in state.assignments.values_mut() {
            for snapshot in snapshots.iter_mut() {
                if snapshot.assignment_id == assignment_id.as_str() {
                    status.clone_into(&mut snapshot.assignment_status);
                    if stamp_approval {
                        snapshot.approval_time = Some(now);
                    } else {
                        snapshot.rejection_time = Some(now);
                    }
                    return Ok(());
                }
            }
        }
        Err(MarketplaceError::Rejected {
            operation,
            message: format!("assignment {assignment_id} does not exist"),
        })
    }
}

fn unknown_hit(operation: &'static str, hit_id: &HitId) -> MarketplaceError {
    MarketplaceError::Rejected {
        operation,
        message: format!("HIT {hit_id} does not exist"),
    }
}

#[async_trait]
impl MarketplaceClient for InMemoryMarketplace {
    async fn list_hits(&self) -> MarketplaceResult<Vec<HitSnapshot>> {
        let state = self.read_state()?;
        let mut snapshots: Vec<HitSnapshot> = state.hits.values().cloned().collect();
        snapshots.sort_by(|a, b| a.hit_id.cmp(&b.hit_id));
        Ok(snapshots)
    }

    async fn list_reviewable_hits(&self) -> MarketplaceResult<Vec<HitSnapshot>> {
        let mut snapshots = self.list_hits().await?;
        snapshots.retain(|snapshot| snapshot.hit_status == "Reviewable");
        Ok(snapshots)
    }

    async fn get_hit(&self, hit_id: &HitId) -> MarketplaceResult<HitSnapshot> {
        let state = self.read_state()?;
        state
            .hits
            .get(hit_id.as_str())
            .cloned()
            .ok_or_else(|| unknown_hit("get_hit", hit_id))
    }

    async fn assignments_for_hit(
        &self,
        hit_id: &HitId,
    ) -> MarketplaceResult<Vec<AssignmentSnapshot>> {
        let state = self.read_state()?;
        if !state.hits.contains_key(hit_id.as_str()) {
            return Err(unknown_hit("assignments_for_hit", hit_id));
        }
        Ok(state
            .assignments
            .get(hit_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn dispose_hit(&self, hit_id: &HitId) -> MarketplaceResult<()> {
        self.update_hit_status(hit_id, "dispose_hit", "Disposed")
    }

    async fn expire_hit(&self, hit_id: &HitId) -> MarketplaceResult<()> {
        // Expiry with all assignments submitted lands the HIT in Reviewable.
        self.update_hit_status(hit_id, "expire_hit", "Reviewable")
    }

    async fn extend_hit(
        &self,
        hit_id: &HitId,
        assignments_increment: Option<u32>,
        _expiration_increment_in_seconds: Option<u32>,
    ) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        let snapshot = state
            .hits
            .get_mut(hit_id.as_str())
            .ok_or_else(|| unknown_hit("extend_hit", hit_id))?;
        if let Some(increment) = assignments_increment {
            snapshot.max_assignments = snapshot.max_assignments.saturating_add(increment);
        }
        "Assignable".clone_into(&mut snapshot.hit_status);
        Ok(())
    }

    async fn set_reviewing(&self, hit_id: &HitId, revert: bool) -> MarketplaceResult<()> {
        let target = if revert { "Reviewable" } else { "Reviewing" };
        self.update_hit_status(hit_id, "set_reviewing", target)
    }

    async fn approve_assignment(
        &self,
        assignment_id: &AssignmentId,
        _feedback: Option<&str>,
    ) -> MarketplaceResult<()> {
        self.update_assignment("approve_assignment", assignment_id, "Approved", true)
    }

    async fn reject_assignment(
        &self,
        assignment_id: &AssignmentId,
        _feedback: Option<&str>,
    ) -> MarketplaceResult<()> {
        self.update_assignment("reject_assignment", assignment_id, "Rejected", false)
    }

    async fn grant_bonus(
        &self,
        worker_id: &WorkerId,
        assignment_id: &AssignmentId,
        amount: Reward,
        feedback: Option<&str>,
    ) -> MarketplaceResult<()> {
        let mut state = self.write_state()?;
        state.bonuses.push(BonusGrant {
            worker_id: worker_id.clone(),
            assignment_id: assignment_id.clone(),
            amount,
            feedback: feedback.map(str::to_owned),
        });
        Ok(())
    }
}
