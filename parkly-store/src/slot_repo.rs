use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkly_core::repository::{RepoResult, SlotRepository};
use parkly_core::{NewSlot, ParkingSlot};
use sqlx::PgPool;

pub struct StoreSlotRepository {
    pool: PgPool,
}

impl StoreSlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SLOT_COLUMNS: &str =
    "id, slot_number, zone, is_occupied, price_per_hour, last_occupied_time, created_at";

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: i64,
    slot_number: String,
    zone: String,
    is_occupied: bool,
    price_per_hour: f64,
    last_occupied_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<SlotRow> for ParkingSlot {
    fn from(row: SlotRow) -> Self {
        ParkingSlot {
            id: row.id,
            slot_number: row.slot_number,
            zone: row.zone,
            is_occupied: row.is_occupied,
            price_per_hour: row.price_per_hour,
            last_occupied_time: row.last_occupied_time,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SlotRepository for StoreSlotRepository {
    async fn list_slots(&self) -> RepoResult<Vec<ParkingSlot>> {
        let rows = sqlx::query_as::<_, SlotRow>(&format!(
            "SELECT {} FROM parking_slots ORDER BY id",
            SLOT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ParkingSlot::from).collect())
    }

    async fn list_available_slots(&self) -> RepoResult<Vec<ParkingSlot>> {
        let rows = sqlx::query_as::<_, SlotRow>(&format!(
            "SELECT {} FROM parking_slots WHERE is_occupied = FALSE ORDER BY id",
            SLOT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ParkingSlot::from).collect())
    }

    async fn get_slot(&self, id: i64) -> RepoResult<Option<ParkingSlot>> {
        let row = sqlx::query_as::<_, SlotRow>(&format!(
            "SELECT {} FROM parking_slots WHERE id = $1",
            SLOT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ParkingSlot::from))
    }

    async fn count_slots(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parking_slots")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_slots(&self, slots: &[NewSlot]) -> RepoResult<Vec<ParkingSlot>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(slots.len());

        for slot in slots {
            let row = sqlx::query_as::<_, SlotRow>(&format!(
                r#"
                INSERT INTO parking_slots (slot_number, zone, price_per_hour)
                VALUES ($1, $2, $3)
                RETURNING {}
                "#,
                SLOT_COLUMNS
            ))
            .bind(&slot.slot_number)
            .bind(&slot.zone)
            .bind(slot.price_per_hour)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(ParkingSlot::from(row));
        }

        tx.commit().await?;

        Ok(inserted)
    }
}
