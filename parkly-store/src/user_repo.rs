use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkly_core::identity::User;
use parkly_core::repository::{RepoResult, UserRepository};
use sqlx::PgPool;

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    vehicle_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            vehicle_type: row.vehicle_type,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn upsert_user(&self, name: &str, email: &str) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email) VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, email, vehicle_type, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, vehicle_type, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_vehicle_type(&self, email: &str, vehicle_type: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET vehicle_type = $1 WHERE email = $2
            RETURNING id, name, email, vehicle_type, created_at
            "#,
        )
        .bind(vehicle_type)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
