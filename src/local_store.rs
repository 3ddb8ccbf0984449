use crate::backend::{BookingOutcome, PortalBackend, RoleUpdate};
use crate::types::{Booking, NewBooking, Slot, User};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Default)]
struct StoreInner {
    users: HashMap<String, User>,
    slots: HashMap<String, i32>,
    bookings: Vec<Booking>,
}

/// Impersistent store used when no database is configured and throughout
/// the test suite. All mutation happens under a single lock, so the
/// reserve-then-record sequence is atomic here by construction.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl LocalStore {
    pub fn insert_slot(&self, name: &str, space: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.slots.insert(name.into(), space);
    }

    pub fn seed_default_slots(&self) {
        const DEFAULT_SPACE: i32 = 10;
        let names = [
            "08.00 AM - 08.30 AM",
            "08.30 AM - 09.00 AM",
            "09.00 AM - 09.30 AM",
            "09.30 AM - 10.00 AM",
            "10.00 AM - 10.30 AM",
            "10.30 AM - 11.00 AM",
        ];
        for name in names {
            self.insert_slot(name, DEFAULT_SPACE);
        }
    }
}

impl PortalBackend for LocalStore {
    fn upsert_user(&self, email: &str, display_name: &str) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .users
            .entry(email.to_string())
            .and_modify(|user| user.display_name = display_name.to_string())
            .or_insert_with(|| User {
                email: email.to_string(),
                display_name: display_name.to_string(),
                role: None,
            });
        Ok(())
    }

    fn users(&self) -> Result<Vec<User>, String> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_unstable_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(email).cloned())
    }

    fn update_role(&self, email: &str, role: Option<&str>) -> Result<RoleUpdate, String> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.get_mut(email) {
            Some(user) => {
                let modified = user.role.as_deref() != role;
                if modified {
                    user.role = role.map(str::to_string);
                }
                Ok(RoleUpdate {
                    matched: true,
                    modified,
                })
            }
            None => Ok(RoleUpdate {
                matched: false,
                modified: false,
            }),
        }
    }

    fn book_appointment(&self, booking: NewBooking) -> Result<BookingOutcome, String> {
        let mut inner = self.inner.lock().unwrap();
        match inner.slots.get_mut(&booking.slot_name) {
            Some(space) if *space > 0 => {
                *space -= 1;
                let id = Uuid::new_v4();
                inner.bookings.push(Booking {
                    id,
                    slot_name: booking.slot_name,
                    email: booking.email,
                    date: booking.date,
                    extra: booking.extra,
                    created_at: Utc::now(),
                });
                Ok(BookingOutcome::Booked(id))
            }
            _ => Ok(BookingOutcome::SlotFull),
        }
    }

    fn appointments(&self, email: &str, date: &str) -> Result<Vec<Booking>, String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .bookings
            .iter()
            .filter(|booking| booking.email == email && booking.date == date)
            .cloned()
            .collect())
    }

    fn available_slots(&self) -> Result<Vec<Slot>, String> {
        let inner = self.inner.lock().unwrap();
        let mut slots: Vec<Slot> = inner
            .slots
            .iter()
            .map(|(name, space)| Slot {
                name: name.clone(),
                space: *space,
            })
            .collect();
        slots.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        Ok(slots)
    }
}
