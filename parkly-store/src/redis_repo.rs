use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkly_core::identity::Session;
use parkly_core::repository::{RepoResult, SessionStore};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::info;

/// Login sessions kept as one Redis hash per session, expiring after the TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Opens the shared connection up front, so an unreachable server fails here
    pub async fn new(connection_string: &str, ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis session store");
        Ok(Self { conn, ttl_seconds })
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put_session(&self, session: &Session) -> RepoResult<()> {
        let mut conn = self.conn.clone();
        let key = Self::key(&session.session_id);

        let _: () = redis::pipe()
            .atomic()
            .hset(&key, "email", &session.email)
            .ignore()
            .hset(&key, "created_at", session.created_at.to_rfc3339())
            .ignore()
            .expire(&key, self.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        info!("Session stored: {} (ttl {}s)", session.session_id, self.ttl_seconds);
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> RepoResult<Option<Session>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(Self::key(session_id)).await?;

        let (Some(email), Some(created_at)) = (fields.get("email"), fields.get("created_at")) else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(created_at)?.with_timezone(&Utc);

        Ok(Some(Session {
            session_id: session_id.to_string(),
            email: email.clone(),
            created_at,
        }))
    }

    async fn delete_session(&self, session_id: &str) -> RepoResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(session_id)).await?;
        Ok(())
    }
}
