//! Repository for the `tours` table.

use panotour_core::tour::TourInput;
use panotour_core::tour_id::{next_tour_id, TOUR_ID_LOCK_ID, TOUR_ID_PREFIX};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use super::is_unique_violation;
use crate::models::tour::Tour;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tour_id, name, description, panoramas, infospots, linkspots, \
                        created_at, updated_at";

/// Unique constraint guarding `tours.tour_id`.
pub const TOUR_ID_CONSTRAINT: &str = "uq_tours_tour_id";

/// How many times `create` retries after a unique violation on `tour_id`.
/// Only rows written outside `create` (which skip the allocation lock) can
/// cause one.
const MAX_ALLOCATION_ATTEMPTS: usize = 3;

/// Provides CRUD operations for tours keyed by their sequential `tour_id`.
pub struct TourRepo;

impl TourRepo {
    /// List every tour in creation order. No pagination.
    pub async fn list(pool: &PgPool) -> Result<Vec<Tour>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tours ORDER BY id ASC");
        sqlx::query_as::<_, Tour>(&query).fetch_all(pool).await
    }

    /// Find a tour by its public `tour_id`.
    pub async fn find_by_tour_id(pool: &PgPool, tour_id: &str) -> Result<Option<Tour>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tours WHERE tour_id = $1");
        sqlx::query_as::<_, Tour>(&query)
            .bind(tour_id)
            .fetch_optional(pool)
            .await
    }

    /// Largest numeric suffix among well-formed tour ids, compared numerically.
    pub async fn max_suffix<'e>(executor: impl PgExecutor<'e>) -> Result<Option<i64>, sqlx::Error> {
        let query = format!(
            "SELECT MAX(CAST(SUBSTRING(tour_id FROM {start}) AS BIGINT)) FROM tours
             WHERE tour_id ~ '^{TOUR_ID_PREFIX}[0-9]{{1,18}}$'",
            start = TOUR_ID_PREFIX.len() + 1
        );
        sqlx::query_scalar::<_, Option<i64>>(&query)
            .fetch_one(executor)
            .await
    }

    /// Insert a tour under an explicit id.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        tour_id: &str,
        input: &TourInput,
    ) -> Result<Tour, sqlx::Error> {
        let query = format!(
            "INSERT INTO tours (tour_id, name, description, panoramas, infospots, linkspots)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tour>(&query)
            .bind(tour_id)
            .bind(&input.name)
            .bind(input.description_or_empty())
            .bind(Json(&input.panoramas))
            .bind(Json(&input.infospots))
            .bind(Json(&input.linkspots))
            .fetch_one(executor)
            .await
    }

    /// Allocate the next sequential id and insert the tour under it.
    ///
    /// Reading the maximum and inserting max + 1 happen in one transaction
    /// holding a transaction-scoped advisory lock, so concurrent creates are
    /// serialized and each sees the previous one's row.
    pub async fn create(pool: &PgPool, input: &TourInput) -> Result<Tour, sqlx::Error> {
        let mut attempt = 1;
        loop {
            match Self::allocate_and_insert(pool, input).await {
                Ok(tour) => return Ok(tour),
                Err(e)
                    if attempt < MAX_ALLOCATION_ATTEMPTS
                        && is_unique_violation(&e, TOUR_ID_CONSTRAINT) =>
                {
                    tracing::warn!(attempt, "Tour id taken outside the allocation lock, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn allocate_and_insert(pool: &PgPool, input: &TourInput) -> Result<Tour, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(TOUR_ID_LOCK_ID)
            .execute(&mut *tx)
            .await?;

        let tour_id = next_tour_id(Self::max_suffix(&mut *tx).await?);
        let tour = Self::insert(&mut *tx, &tour_id, input).await?;

        tx.commit().await?;
        Ok(tour)
    }

    /// Replace the full editable snapshot of a tour. `updated_at` is stamped
    /// by trigger.
    ///
    /// Returns `None` (and writes nothing) if no tour has this id.
    pub async fn replace(
        pool: &PgPool,
        tour_id: &str,
        input: &TourInput,
    ) -> Result<Option<Tour>, sqlx::Error> {
        let query = format!(
            "UPDATE tours SET
                name = $2,
                description = $3,
                panoramas = $4,
                infospots = $5,
                linkspots = $6
             WHERE tour_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tour>(&query)
            .bind(tour_id)
            .bind(&input.name)
            .bind(input.description_or_empty())
            .bind(Json(&input.panoramas))
            .bind(Json(&input.infospots))
            .bind(Json(&input.linkspots))
            .fetch_optional(pool)
            .await
    }

    /// Delete a tour row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tour_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tours WHERE tour_id = $1")
            .bind(tour_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
