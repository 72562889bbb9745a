use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkly_core::identity::{Session, User};
use parkly_core::repository::{
    BookingRepository, RepoResult, SessionStore, SlotRepository, UserRepository,
};
use parkly_core::{booking_cost, Booking, BookingStatus, NewBooking, NewSlot, ParkingSlot};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Default)]
struct ParkingState {
    slots: BTreeMap<i64, ParkingSlot>,
    bookings: BTreeMap<i64, Booking>,
    next_slot_id: i64,
    next_booking_id: i64,
}

/// In-memory slot and booking store.
///
/// One lock guards slots and bookings together, so each lifecycle write is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<ParkingState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotRepository for MemoryStore {
    async fn list_slots(&self) -> RepoResult<Vec<ParkingSlot>> {
        Ok(self.state.read().await.slots.values().cloned().collect())
    }

    async fn list_available_slots(&self) -> RepoResult<Vec<ParkingSlot>> {
        let state = self.state.read().await;
        Ok(state.slots.values().filter(|s| !s.is_occupied).cloned().collect())
    }

    async fn get_slot(&self, id: i64) -> RepoResult<Option<ParkingSlot>> {
        Ok(self.state.read().await.slots.get(&id).cloned())
    }

    async fn count_slots(&self) -> RepoResult<i64> {
        Ok(self.state.read().await.slots.len() as i64)
    }

    async fn insert_slots(&self, slots: &[NewSlot]) -> RepoResult<Vec<ParkingSlot>> {
        let mut state = self.state.write().await;

        for slot in slots {
            if state.slots.values().any(|s| s.slot_number == slot.slot_number) {
                return Err(format!("duplicate slot number {}", slot.slot_number).into());
            }
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(slots.len());
        for slot in slots {
            state.next_slot_id += 1;
            let record = ParkingSlot {
                id: state.next_slot_id,
                slot_number: slot.slot_number.clone(),
                zone: slot.zone.clone(),
                is_occupied: false,
                price_per_hour: slot.price_per_hour,
                last_occupied_time: None,
                created_at: now,
            };
            state.slots.insert(record.id, record.clone());
            inserted.push(record);
        }

        Ok(inserted)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn get_booking(&self, id: i64) -> RepoResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn create_booking(&self, booking: &NewBooking) -> RepoResult<Booking> {
        let mut state = self.state.write().await;

        let mut total_cost = None;
        if let Some(slot) = state.slots.get_mut(&booking.slot_id) {
            if slot.is_occupied {
                warn!("Slot {} is already occupied, overwriting its occupancy", slot.id);
            }
            slot.is_occupied = true;
            slot.last_occupied_time = Some(booking.start_time);
            total_cost = booking
                .end_time
                .map(|end| booking_cost(booking.start_time, end, slot.price_per_hour));
        }

        state.next_booking_id += 1;
        let record = Booking {
            id: state.next_booking_id,
            slot_id: booking.slot_id,
            user_name: booking.user_name.clone(),
            contact_email: booking.contact_email.clone(),
            vehicle_number: booking.vehicle_number.clone(),
            start_time: booking.start_time,
            end_time: booking.end_time,
            total_cost,
            status: BookingStatus::Active,
        };
        state.bookings.insert(record.id, record.clone());

        Ok(record)
    }

    async fn complete_booking(&self, id: i64, end_time: DateTime<Utc>) -> RepoResult<Option<Booking>> {
        let mut state = self.state.write().await;
        let ParkingState { slots, bookings, .. } = &mut *state;

        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };
        if !booking.is_active() {
            return Ok(Some(booking.clone()));
        }

        let slot = slots.get_mut(&booking.slot_id);
        if let Some(slot) = &slot {
            booking.total_cost = Some(booking_cost(booking.start_time, end_time, slot.price_per_hour));
        }
        booking.end_time = Some(end_time);
        booking.status = BookingStatus::Completed;

        // last_occupied_time is left as is
        if let Some(slot) = slot {
            slot.is_occupied = false;
        }

        Ok(Some(booking.clone()))
    }

    async fn list_bookings(&self, limit: i64) -> RepoResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().cloned().collect();
        bookings.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        bookings.truncate(limit.max(0) as usize);
        Ok(bookings)
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn upsert_user(&self, name: &str, email: &str) -> RepoResult<User> {
        let mut users = self.users.write().await;
        let next_id = users.len() as i64 + 1;

        let user = users
            .entry(email.to_string())
            .and_modify(|u| u.name = name.to_string())
            .or_insert_with(|| User {
                id: next_id,
                name: name.to_string(),
                email: email.to_string(),
                vehicle_type: None,
                created_at: Utc::now(),
            });

        Ok(user.clone())
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn update_vehicle_type(&self, email: &str, vehicle_type: &str) -> RepoResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(email).map(|u| {
            u.vehicle_type = Some(vehicle_type.to_string());
            u.clone()
        }))
    }
}

/// Process-local sessions, gone on restart
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put_session(&self, session: &Session) -> RepoResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> RepoResult<Option<Session>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn delete_session(&self, session_id: &str) -> RepoResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_slot(number: &str, zone: &str, price: f64) -> NewSlot {
        NewSlot {
            slot_number: number.to_string(),
            zone: zone.to_string(),
            price_per_hour: price,
        }
    }

    fn new_booking(slot_id: i64, start: DateTime<Utc>) -> NewBooking {
        NewBooking {
            slot_id,
            user_name: "dana".to_string(),
            contact_email: None,
            vehicle_number: None,
            start_time: start,
            end_time: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_slots() {
        let store = MemoryStore::new();
        let slots = store
            .insert_slots(&[new_slot("A01", "A", 80.0), new_slot("B01", "B", 50.0)])
            .await
            .unwrap();

        assert_eq!(slots[0].id, 1);
        assert_eq!(slots[1].id, 2);
        assert_eq!(store.count_slots().await.unwrap(), 2);
        assert_eq!(store.get_slot(2).await.unwrap().unwrap().slot_number, "B01");
        assert!(store.get_slot(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slot_number_rejected() {
        let store = MemoryStore::new();
        store.insert_slots(&[new_slot("A01", "A", 80.0)]).await.unwrap();

        let result = store.insert_slots(&[new_slot("A01", "A", 80.0)]).await;
        assert!(result.is_err());
        assert_eq!(store.count_slots().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_booking_occupies_and_completion_releases() {
        let store = MemoryStore::new();
        store.insert_slots(&[new_slot("A01", "A", 80.0)]).await.unwrap();
        let start = Utc::now() - Duration::hours(1);

        let booking = store.create_booking(&new_booking(1, start)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Active);
        let slot = store.get_slot(1).await.unwrap().unwrap();
        assert!(slot.is_occupied);
        assert_eq!(slot.last_occupied_time, Some(start));
        assert!(store.list_available_slots().await.unwrap().is_empty());

        let done = store
            .complete_booking(booking.id, start + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert_eq!(done.total_cost, Some(80.0));
        let slot = store.get_slot(1).await.unwrap().unwrap();
        assert!(!slot.is_occupied);
        assert_eq!(slot.last_occupied_time, Some(start));

        assert!(store.complete_booking(99, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_planned_end_is_priced_at_slot_rate() {
        let store = MemoryStore::new();
        store.insert_slots(&[new_slot("B01", "B", 50.0)]).await.unwrap();
        let start = Utc::now();

        let mut planned = new_booking(1, start);
        planned.end_time = Some(start + Duration::minutes(90));
        assert_eq!(store.create_booking(&planned).await.unwrap().total_cost, Some(75.0));

        let mut elsewhere = new_booking(7, start);
        elsewhere.end_time = Some(start + Duration::minutes(90));
        assert_eq!(store.create_booking(&elsewhere).await.unwrap().total_cost, None);
    }

    #[tokio::test]
    async fn test_completing_a_completed_booking_changes_nothing() {
        let store = MemoryStore::new();
        store
            .insert_slots(&[new_slot("A01", "A", 80.0), new_slot("A02", "A", 80.0)])
            .await
            .unwrap();
        let start = Utc::now();

        let booking = store.create_booking(&new_booking(1, start)).await.unwrap();
        let first = store
            .complete_booking(booking.id, start + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();

        // The slot is taken again before a late second completion arrives
        store.create_booking(&new_booking(1, start + Duration::hours(2))).await.unwrap();
        let late = store
            .complete_booking(booking.id, start + Duration::hours(5))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(late, first);
        assert_eq!(late.end_time, Some(start + Duration::hours(1)));
        assert_eq!(late.total_cost, Some(80.0));
        assert!(store.get_slot(1).await.unwrap().unwrap().is_occupied);
    }

    #[tokio::test]
    async fn test_concurrent_completions_settle_once() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.insert_slots(&[new_slot("A01", "A", 80.0)]).await.unwrap();
        let start = Utc::now();
        let booking_id = store.create_booking(&new_booking(1, start)).await.unwrap().id;

        let tasks: Vec<_> = (1..=5)
            .map(|hours| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .complete_booking(booking_id, start + Duration::hours(hours))
                        .await
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        let stored = store.get_booking(booking_id).await.unwrap().unwrap();
        assert!(results.iter().all(|b| *b == stored));
        let hours = (stored.end_time.unwrap() - start).num_hours() as f64;
        assert_eq!(stored.total_cost, Some(80.0 * hours));
    }

    #[tokio::test]
    async fn test_list_bookings_most_recent_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for hours in [3, 1, 2] {
            store
                .create_booking(&new_booking(1, now - Duration::hours(hours)))
                .await
                .unwrap();
        }

        let bookings = store.list_bookings(2).await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].start_time, now - Duration::hours(1));
        assert_eq!(bookings[1].start_time, now - Duration::hours(2));
        assert!(store.list_bookings(-1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_upsert_keeps_id() {
        let users = MemoryUserRepository::new();
        let first = users.upsert_user("Dana", "dana@example.com").await.unwrap();
        let again = users.upsert_user("Dana R.", "dana@example.com").await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.name, "Dana R.");

        let updated = users
            .update_vehicle_type("dana@example.com", "SUV")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.vehicle_type.as_deref(), Some("SUV"));
        assert!(users.update_vehicle_type("x@example.com", "SUV").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_store_lifecycle() {
        let sessions = MemorySessionStore::new();
        let session = Session {
            session_id: "sess_1".to_string(),
            email: "dana@example.com".to_string(),
            created_at: Utc::now(),
        };

        sessions.put_session(&session).await.unwrap();
        assert_eq!(sessions.get_session("sess_1").await.unwrap(), Some(session));

        sessions.delete_session("sess_1").await.unwrap();
        assert!(sessions.get_session("sess_1").await.unwrap().is_none());
    }
}
