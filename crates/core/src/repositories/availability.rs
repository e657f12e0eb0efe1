//! Professionals' time slots.

use api_shared::{AvailabilityCreateReq, AvailabilityUpdateReq};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{new_id, AvailabilityRow};
use crate::validation::validate_slot;
use crate::{CoreError, CoreResult};

pub const SLOT_NOT_FOUND: &str = "Slot not found";
pub const SLOT_OVERLAP: &str = "Slot overlaps an existing slot";

#[derive(Clone, Debug)]
pub struct AvailabilityService {
    pool: PgPool,
}

impl AvailabilityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a slot. Slots of one professional may not overlap on the same date.
    pub async fn create(
        &self,
        professional_id: &str,
        req: &AvailabilityCreateReq,
    ) -> CoreResult<AvailabilityRow> {
        validate_slot(&req.date, &req.start_time, &req.end_time)?;

        let mut tx = self.pool.begin().await?;
        lock_calendar(&mut tx, professional_id).await?;
        ensure_free(&mut tx, professional_id, None, &req.date, &req.start_time, &req.end_time)
            .await?;

        let row = sqlx::query_as::<_, AvailabilityRow>(
            "INSERT INTO availability
                (id, professional_id, date, start_time, end_time, is_recurring, recurrence_pattern)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new_id())
        .bind(professional_id)
        .bind(&req.date)
        .bind(&req.start_time)
        .bind(&req.end_time)
        .bind(req.is_recurring)
        .bind(req.recurrence_pattern.map(|p| p.as_str()))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// All slots of `professional_id`, booked or not.
    pub async fn list_own(&self, professional_id: &str) -> CoreResult<Vec<AvailabilityRow>> {
        Ok(sqlx::query_as::<_, AvailabilityRow>(
            "SELECT * FROM availability WHERE professional_id = $1 ORDER BY date, start_time",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Unbooked slots visible to customers.
    pub async fn list_open(&self, professional_id: &str) -> CoreResult<Vec<AvailabilityRow>> {
        Ok(sqlx::query_as::<_, AvailabilityRow>(
            "SELECT * FROM availability
             WHERE professional_id = $1 AND NOT is_booked
             ORDER BY date, start_time",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn require_owned(&self, slot_id: &str, user_id: &str) -> CoreResult<AvailabilityRow> {
        let slot = sqlx::query_as::<_, AvailabilityRow>("SELECT * FROM availability WHERE id = $1")
            .bind(slot_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(SLOT_NOT_FOUND))?;
        if slot.professional_id != user_id {
            return Err(CoreError::forbidden("Not authorized"));
        }
        Ok(slot)
    }

    pub async fn update(
        &self,
        slot_id: &str,
        user_id: &str,
        update: &AvailabilityUpdateReq,
    ) -> CoreResult<AvailabilityRow> {
        let slot = self.require_owned(slot_id, user_id).await?;

        let date = update.date.as_deref().unwrap_or(&slot.date);
        let start = update.start_time.as_deref().unwrap_or(&slot.start_time);
        let end = update.end_time.as_deref().unwrap_or(&slot.end_time);
        validate_slot(date, start, end)?;

        let mut tx = self.pool.begin().await?;
        lock_calendar(&mut tx, user_id).await?;
        ensure_free(&mut tx, user_id, Some(slot_id), date, start, end).await?;

        let row = sqlx::query_as::<_, AvailabilityRow>(
            "UPDATE availability SET
                date = $2,
                start_time = $3,
                end_time = $4,
                is_recurring = COALESCE($5, is_recurring),
                recurrence_pattern = COALESCE($6, recurrence_pattern)
             WHERE id = $1
             RETURNING *",
        )
        .bind(slot_id)
        .bind(date)
        .bind(start)
        .bind(end)
        .bind(update.is_recurring)
        .bind(update.recurrence_pattern.map(|p| p.as_str()))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn delete(&self, slot_id: &str, user_id: &str) -> CoreResult<()> {
        self.require_owned(slot_id, user_id).await?;
        sqlx::query("DELETE FROM availability WHERE id = $1")
            .bind(slot_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Serializes calendar changes of one professional.
async fn lock_calendar(tx: &mut Transaction<'_, Postgres>, professional_id: &str) -> CoreResult<()> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(professional_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Fails when `[start, end)` intersects another slot on `date`. Times are zero-padded `HH:MM`,
/// so text order is time order.
async fn ensure_free(
    tx: &mut Transaction<'_, Postgres>,
    professional_id: &str,
    except_slot: Option<&str>,
    date: &str,
    start: &str,
    end: &str,
) -> CoreResult<()> {
    let clash: bool = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM availability
             WHERE professional_id = $1 AND date = $2
               AND start_time < $4 AND end_time > $3
               AND ($5::text IS NULL OR id <> $5)
         )",
    )
    .bind(professional_id)
    .bind(date)
    .bind(start)
    .bind(end)
    .bind(except_slot)
    .fetch_one(&mut **tx)
    .await?;
    if clash {
        return Err(CoreError::invalid(SLOT_OVERLAP));
    }
    Ok(())
}
