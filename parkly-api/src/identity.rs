use std::sync::Arc;
use chrono::Utc;
use parkly_core::identity::{Session, User};
use parkly_core::repository::{SessionStore, UserRepository};
use parkly_core::CoreResult;
use uuid::Uuid;

/// Driver accounts and their login sessions.
///
/// Passwords are not checked: knowing a registered e-mail is enough to log in.
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Registering an e-mail again renames the existing account
    pub async fn register(&self, name: &str, email: &str) -> CoreResult<User> {
        let user = self.users.upsert_user(name, email).await?;
        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self.users.get_user_by_email(email).await?)
    }

    pub async fn login(&self, email: &str) -> CoreResult<Option<(User, Session)>> {
        let Some(user) = self.authenticate(email).await? else {
            return Ok(None);
        };

        let session = Session {
            session_id: format!("sess_{}", Uuid::new_v4().simple()),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        self.sessions.put_session(&session).await?;

        Ok(Some((user, session)))
    }

    pub async fn session_user(&self, session_id: &str) -> CoreResult<Option<User>> {
        let Some(session) = self.sessions.get_session(session_id).await? else {
            return Ok(None);
        };
        Ok(self.users.get_user_by_email(&session.email).await?)
    }

    pub async fn update_vehicle(&self, email: &str, vehicle_type: &str) -> CoreResult<Option<User>> {
        Ok(self.users.update_vehicle_type(email, vehicle_type).await?)
    }

    pub async fn logout(&self, session_id: &str) -> CoreResult<()> {
        Ok(self.sessions.delete_session(session_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkly_store::{MemorySessionStore, MemoryUserRepository};

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn test_login_requires_registration() {
        let identity = service();
        assert!(identity.login("nobody@example.com").await.unwrap().is_none());

        identity.register("Dana", "dana@example.com").await.unwrap();
        let (user, session) = identity.login("dana@example.com").await.unwrap().unwrap();

        assert_eq!(user.name, "Dana");
        assert!(session.session_id.starts_with("sess_"));
        assert_eq!(
            identity.session_user(&session.session_id).await.unwrap().map(|u| u.id),
            Some(user.id)
        );
    }

    #[tokio::test]
    async fn test_sessions_are_distinct_and_revocable() {
        let identity = service();
        identity.register("Dana", "dana@example.com").await.unwrap();

        let (_, first) = identity.login("dana@example.com").await.unwrap().unwrap();
        let (_, second) = identity.login("dana@example.com").await.unwrap().unwrap();
        assert_ne!(first.session_id, second.session_id);

        identity.logout(&first.session_id).await.unwrap();
        assert!(identity.session_user(&first.session_id).await.unwrap().is_none());
        assert!(identity.session_user(&second.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_vehicle() {
        let identity = service();
        identity.register("Dana", "dana@example.com").await.unwrap();

        let user = identity
            .update_vehicle("dana@example.com", "Hatchback")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.vehicle_type.as_deref(), Some("Hatchback"));
        assert!(identity.update_vehicle("x@example.com", "SUV").await.unwrap().is_none());
    }
}
