//! Thread-safe in-memory mirror store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::mirror::{
    domain::{AnswerKeyValue, Assignment, AssignmentId, Hit, HitId},
    ports::{MirrorStore, StoreError, StoreResult},
};

/// In-memory mirror store.
///
/// Suitable for tests and for local deterministic runs. Every operation takes
/// the single state lock once, so get-or-create is race-safe by construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMirrorStore {
    state: Arc<RwLock<InMemoryMirrorState>>,
}

#[derive(Debug, Default)]
struct InMemoryMirrorState {
    hits: HashMap<HitId, Hit>,
    assignments: HashMap<AssignmentId, Assignment>,
    hit_assignments: HashMap<HitId, Vec<AssignmentId>>,
    answers: HashMap<(AssignmentId, String), AnswerKeyValue>,
}

impl InMemoryMirrorStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of HIT rows, for test assertions about uniqueness.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn hit_count(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.hits.len())
    }

    /// Returns the number of assignment rows.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn assignment_count(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.assignments.len())
    }

    fn read_state(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, InMemoryMirrorState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, InMemoryMirrorState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl MirrorStore for InMemoryMirrorStore {
    async fn get_or_create_hit(&self, hit_id: &HitId) -> StoreResult<Hit> {
        let mut state = self.write_state()?;
        let hit = state
            .hits
            .entry(hit_id.clone())
            .or_insert_with(|| Hit::new(hit_id.clone()));
        Ok(hit.clone())
    }

    async fn find_hit(&self, hit_id: &HitId) -> StoreResult<Option<Hit>> {
        Ok(self.read_state()?.hits.get(hit_id).cloned())
    }

    async fn save_hit(&self, hit: &Hit) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.hits.insert(hit.remote_id().clone(), hit.clone());
        Ok(())
    }

    async fn get_or_create_assignment(
        &self,
        assignment_id: &AssignmentId,
        hit_id: &HitId,
    ) -> StoreResult<Assignment> {
        let mut state = self.write_state()?;
        if !state.hits.contains_key(hit_id) {
            return Err(StoreError::HitNotFound(hit_id.clone()));
        }
        if let Some(existing) = state.assignments.get(assignment_id) {
            if existing.hit_id() != hit_id {
                return Err(StoreError::AssignmentOwnedByOtherHit {
                    assignment_id: assignment_id.clone(),
                    requested: hit_id.clone(),
                    actual: existing.hit_id().clone(),
                });
            }
            return Ok(existing.clone());
        }
        let assignment = Assignment::new(assignment_id.clone(), hit_id.clone());
        state
            .hit_assignments
            .entry(hit_id.clone())
            .or_default()
            .push(assignment_id.clone());
        state
            .assignments
            .insert(assignment_id.clone(), assignment.clone());
        Ok(assignment)
    }

    async fn find_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> StoreResult<Option<Assignment>> {
        Ok(self.read_state()?.assignments.get(assignment_id).cloned())
    }

    async fn save_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if let Some(existing) = state.assignments.get(assignment.remote_id()) {
            if existing.hit_id() != assignment.hit_id() {
                return Err(StoreError::AssignmentOwnedByOtherHit {
                    assignment_id: assignment.remote_id().clone(),
                    requested: assignment.hit_id().clone(),
                    actual: existing.hit_id().clone(),
                });
            }
        } else {
            state
                .hit_assignments
                .entry(assignment.hit_id().clone())
                .or_default()
                .push(assignment.remote_id().clone());
        }
        state
            .assignments
            .insert(assignment.remote_id().clone(), assignment.clone());
        Ok(())
    }

    async fn assignments_for_hit(&self, hit_id: &HitId) -> StoreResult<Vec<Assignment>> {
        let state = self.read_state()?;
        let assignments = state
            .hit_assignments
            .get(hit_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.assignments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(assignments)
    }

    async fn get_or_create_answer(
        &self,
        assignment_id: &AssignmentId,
        key: &str,
    ) -> StoreResult<AnswerKeyValue> {
        let mut state = self.write_state()?;
        if !state.assignments.contains_key(assignment_id) {
            return Err(StoreError::AssignmentNotFound(assignment_id.clone()));
        }
        let answer = state
            .answers
            .entry((assignment_id.clone(), key.to_owned()))
            .or_insert_with(|| AnswerKeyValue::new(assignment_id.clone(), key));
        Ok(answer.clone())
    }

    async fn save_answer(&self, answer: &AnswerKeyValue) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.answers.insert(
            (answer.assignment_id().clone(), answer.key().to_owned()),
            answer.clone(),
        );
        Ok(())
    }

    async fn answers_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> StoreResult<Vec<AnswerKeyValue>> {
        let state = self.read_state()?;
        let mut answers: Vec<AnswerKeyValue> = state
            .answers
            .values()
            .filter(|answer| answer.assignment_id() == assignment_id)
            .cloned()
            .collect();
        answers.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(answers)
    }
}
