//! Bookings repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::booking::{Booking, BookingStatus, NewBooking},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<Booking>;

    /// Bookings made by a user, start descending then id ascending
    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>>;

    /// Bookings of every item owned by a user, same ordering as `list_by_booker`
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>>;

    /// Bookings of the given items, start ascending
    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>>;

    /// Whether `booker_id` has an approved booking of `item_id` that ended before `now`
    async fn has_completed_booking(
        &self,
        item_id: i64,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn create(&self, booking: &NewBooking) -> AppResult<Booking>;

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking>;
}

pub(crate) fn booking_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Booking with ID {} not found", id))
}

#[derive(Clone)]
pub struct PgBookingsRepository {
    pool: Pool<Postgres>,
}

impl PgBookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingsRepository for PgBookingsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "SELECT id, item_id, booker_id, start_date, end_date, status FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| booking_not_found(id))
    }

    async fn list_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, item_id, booker_id, start_date, end_date, status
            FROM bookings
            WHERE booker_id = $1
            ORDER BY start_date DESC, id
            "#,
        )
        .bind(booker_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.id, b.item_id, b.booker_id, b.start_date, b.end_date, b.status
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            WHERE i.owner_id = $1
            ORDER BY b.start_date DESC, b.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, item_id, booker_id, start_date, end_date, status
            FROM bookings
            WHERE item_id = ANY($1)
            ORDER BY start_date, id
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn has_completed_booking(
        &self,
        item_id: i64,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE item_id = $1 AND booker_id = $2 AND status = $3 AND end_date < $4
            )
            "#,
        )
        .bind(item_id)
        .bind(booker_id)
        .bind(BookingStatus::Approved)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, booking: &NewBooking) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (item_id, booker_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, item_id, booker_id, start_date, end_date, status
            "#,
        )
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $1 WHERE id = $2
            RETURNING id, item_id, booker_id, start_date, end_date, status
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| booking_not_found(id))
    }
}
