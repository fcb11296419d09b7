//! `PostgreSQL` mirror store implementation.

use super::{
    models::{
        AnswerRow, AssignmentRow, HitRow, answer_to_row, assignment_to_row, hit_to_row,
        row_to_answer, row_to_assignment, row_to_hit,
    },
    schema::{answer_key_values, assignments, hits},
};
use crate::mirror::{
    domain::{AnswerKeyValue, Assignment, AssignmentId, Hit, HitId},
    ports::{MirrorStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the mirror store.
pub type MirrorPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed mirror store.
///
/// get-or-create is implemented as `INSERT .. ON CONFLICT DO NOTHING`
/// followed by a select, so the primary-key unique index is the backstop when
/// two sync paths observe the same new remote id concurrently. Saves are full
/// row upserts; each one is a single atomic statement.
#[derive(Debug, Clone)]
pub struct PostgresMirrorStore {
    pool: MirrorPgPool,
}

impl PostgresMirrorStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MirrorPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

fn load_hit_row(connection: &mut PgConnection, hit_id: &HitId) -> StoreResult<Option<HitRow>> {
    hits::table
        .filter(hits::remote_id.eq(hit_id.as_str()))
        .select(HitRow::as_select())
        .first::<HitRow>(connection)
        .optional()
        .map_err(StoreError::persistence)
}

fn load_assignment_row(
    connection: &mut PgConnection,
    assignment_id: &AssignmentId,
) -> StoreResult<Option<AssignmentRow>> {
    assignments::table
        .filter(assignments::remote_id.eq(assignment_id.as_str()))
        .select(AssignmentRow::as_select())
        .first::<AssignmentRow>(connection)
        .optional()
        .map_err(StoreError::persistence)
}

#[async_trait]
impl MirrorStore for PostgresMirrorStore {
    async fn get_or_create_hit(&self, hit_id: &HitId) -> StoreResult<Hit> {
        let lookup_id = hit_id.clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(hits::table)
                .values(HitRow::empty(&lookup_id))
                .on_conflict(hits::remote_id)
                .do_nothing()
                .execute(connection)
                .map_err(StoreError::persistence)?;

            let row = load_hit_row(connection, &lookup_id)?.ok_or_else(|| {
                StoreError::persistence(std::io::Error::other(
                    "row vanished between upsert and select",
                ))
            })?;
            row_to_hit(row)
        })
        .await
    }

    async fn find_hit(&self, hit_id: &HitId) -> StoreResult<Option<Hit>> {
        let lookup_id = hit_id.clone();
        self.run_blocking(move |connection| {
            load_hit_row(connection, &lookup_id)?.map(row_to_hit).transpose()
        })
        .await
    }

    async fn save_hit(&self, hit: &Hit) -> StoreResult<()> {
        let row = hit_to_row(hit)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(hits::table)
                .values(&row)
                .on_conflict(hits::remote_id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn get_or_create_assignment(
        &self,
        assignment_id: &AssignmentId,
        hit_id: &HitId,
    ) -> StoreResult<Assignment> {
        let lookup_id = assignment_id.clone();
        let owner_id = hit_id.clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(assignments::table)
                .values(AssignmentRow::empty(&lookup_id, &owner_id))
                .on_conflict(assignments::remote_id)
                .do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::HitNotFound(owner_id.clone())
                    }
                    _ => StoreError::persistence(err),
                })?;

            let row = load_assignment_row(connection, &lookup_id)?.ok_or_else(|| {
                StoreError::persistence(std::io::Error::other(
                    "row vanished between upsert and select",
                ))
            })?;
            if row.hit_id != owner_id.as_str() {
                let actual = HitId::new(row.hit_id).map_err(StoreError::persistence)?;
                return Err(StoreError::AssignmentOwnedByOtherHit {
                    assignment_id: lookup_id.clone(),
                    requested: owner_id.clone(),
                    actual,
                });
            }
            row_to_assignment(row)
        })
        .await
    }

    async fn find_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> StoreResult<Option<Assignment>> {
        let lookup_id = assignment_id.clone();
        self.run_blocking(move |connection| {
            load_assignment_row(connection, &lookup_id)?
                .map(row_to_assignment)
                .transpose()
        })
        .await
    }

    async fn save_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        let row = assignment_to_row(assignment);
        let owner_id = assignment.hit_id().clone();
        let record_id = assignment.remote_id().clone();
        self.run_blocking(move |connection| {
            // An assignment never migrates between HITs; refuse a save that
            // names a different owner than the stored row.
            if let Some(existing) = load_assignment_row(connection, &record_id)? {
                if existing.hit_id != owner_id.as_str() {
                    let actual = HitId::new(existing.hit_id).map_err(StoreError::persistence)?;
                    return Err(StoreError::AssignmentOwnedByOtherHit {
                        assignment_id: record_id.clone(),
                        requested: owner_id.clone(),
                        actual,
                    });
                }
            }
            diesel::insert_into(assignments::table)
                .values(&row)
                .on_conflict(assignments::remote_id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::HitNotFound(owner_id.clone())
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn assignments_for_hit(&self, hit_id: &HitId) -> StoreResult<Vec<Assignment>> {
        let owner_id = hit_id.clone();
        self.run_blocking(move |connection| {
            let rows = assignments::table
                .filter(assignments::hit_id.eq(owner_id.as_str()))
                .order(assignments::remote_id.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn get_or_create_answer(
        &self,
        assignment_id: &AssignmentId,
        key: &str,
    ) -> StoreResult<AnswerKeyValue> {
        let owner_id = assignment_id.clone();
        let answer_key = key.to_owned();
        self.run_blocking(move |connection| {
            diesel::insert_into(answer_key_values::table)
                .values(AnswerRow {
                    assignment_id: owner_id.as_str().to_owned(),
                    key: answer_key.clone(),
                    value: String::new(),
                })
                .on_conflict((answer_key_values::assignment_id, answer_key_values::key))
                .do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::AssignmentNotFound(owner_id.clone())
                    }
                    _ => StoreError::persistence(err),
                })?;

            let row = answer_key_values::table
                .filter(answer_key_values::assignment_id.eq(owner_id.as_str()))
                .filter(answer_key_values::key.eq(answer_key.as_str()))
                .select(AnswerRow::as_select())
                .first::<AnswerRow>(connection)
                .map_err(StoreError::persistence)?;
            row_to_answer(row)
        })
        .await
    }

    async fn save_answer(&self, answer: &AnswerKeyValue) -> StoreResult<()> {
        let row = answer_to_row(answer);
        let owner_id = answer.assignment_id().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(answer_key_values::table)
                .values(&row)
                .on_conflict((answer_key_values::assignment_id, answer_key_values::key))
                .do_update()
                .set(answer_key_values::value.eq(&row.value))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::AssignmentNotFound(owner_id.clone())
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn answers_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> StoreResult<Vec<AnswerKeyValue>> {
        let owner_id = assignment_id.clone();
        self.run_blocking(move |connection| {
            let rows = answer_key_values::table
                .filter(answer_key_values::assignment_id.eq(owner_id.as_str()))
                .order(answer_key_values::key.asc())
                .select(AnswerRow::as_select())
                .load::<AnswerRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_answer).collect()
        })
        .await
    }
}
