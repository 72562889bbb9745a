use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkly_core::repository::{BookingRepository, RepoResult};
use parkly_core::{booking_cost, Booking, BookingStatus, CoreError, NewBooking};
use parkly_shared::Masked;
use sqlx::PgPool;
use tracing::{debug, warn};

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str =
    "id, slot_id, user_name, contact_email, vehicle_number, start_time, end_time, total_cost, status";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    slot_id: i64,
    user_name: String,
    contact_email: Option<String>,
    vehicle_number: Option<String>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    total_cost: Option<f64>,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            slot_id: row.slot_id,
            user_name: row.user_name,
            contact_email: row.contact_email.map(Masked),
            vehicle_number: row.vehicle_number,
            start_time: row.start_time,
            end_time: row.end_time,
            total_cost: row.total_cost,
            status: row.status.parse()?,
        })
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn get_booking(&self, id: i64) -> RepoResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Booking::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn create_booking(&self, booking: &NewBooking) -> RepoResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let slot: Option<(f64, bool)> = sqlx::query_as(
            "SELECT price_per_hour, is_occupied FROM parking_slots WHERE id = $1 FOR UPDATE",
        )
        .bind(booking.slot_id)
        .fetch_optional(&mut *tx)
        .await?;

        let total_cost = match slot {
            Some((price_per_hour, is_occupied)) => {
                if is_occupied {
                    warn!("Slot {} is already occupied, overwriting its occupancy", booking.slot_id);
                }

                sqlx::query(
                    "UPDATE parking_slots SET is_occupied = TRUE, last_occupied_time = $1 WHERE id = $2",
                )
                .bind(booking.start_time)
                .bind(booking.slot_id)
                .execute(&mut *tx)
                .await?;

                booking
                    .end_time
                    .map(|end| booking_cost(booking.start_time, end, price_per_hour))
            }
            None => {
                debug!("Booking references unknown slot {}", booking.slot_id);
                None
            }
        };

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (slot_id, user_name, contact_email, vehicle_number, start_time, end_time, total_cost, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.slot_id)
        .bind(&booking.user_name)
        .bind(booking.contact_email.as_ref().map(|e| e.expose().as_str()))
        .bind(booking.vehicle_number.as_deref())
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(total_cost)
        .bind(BookingStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Booking::try_from(row)?)
    }

    async fn complete_booking(&self, id: i64, end_time: DateTime<Utc>) -> RepoResult<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent completions of the same booking
        let current = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            tx.rollback().await?;
            return Ok(None);
        };
        let current = Booking::try_from(current)?;
        if !current.is_active() {
            tx.rollback().await?;
            return Ok(Some(current));
        }

        let price_per_hour: Option<f64> =
            sqlx::query_scalar("SELECT price_per_hour FROM parking_slots WHERE id = $1 FOR UPDATE")
                .bind(current.slot_id)
                .fetch_optional(&mut *tx)
                .await?;
        let total_cost = price_per_hour
            .map(|price| booking_cost(current.start_time, end_time, price))
            .or(current.total_cost);

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET end_time = $1, total_cost = $2, status = $3
            WHERE id = $4 AND status = $5
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(end_time)
        .bind(total_cost)
        .bind(BookingStatus::Completed.as_str())
        .bind(id)
        .bind(BookingStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // last_occupied_time is left as is
        sqlx::query("UPDATE parking_slots SET is_occupied = FALSE WHERE id = $1")
            .bind(row.slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(Booking::try_from(row)?))
    }

    async fn list_bookings(&self, limit: i64) -> RepoResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY start_time DESC, id DESC LIMIT $1",
            BOOKING_COLUMNS
        ))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            bookings.push(Booking::try_from(row)?);
        }
        Ok(bookings)
    }
}
