use crate::auth::TokenVerifier;
use crate::backend::{BookingOutcome, PortalBackend, RoleUpdate};
use crate::payments::{PaymentGateway, PaymentIntent};
use crate::types::{Booking, NewBooking, Slot, User};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct MockPortalBackendInner {
    pub success: AtomicBool,
    pub calls_to_upsert_user: AtomicU64,
    pub calls_to_users: AtomicU64,
    pub calls_to_find_user: AtomicU64,
    pub calls_to_update_role: AtomicU64,
    pub calls_to_book_appointment: AtomicU64,
    pub calls_to_appointments: AtomicU64,
    pub calls_to_available_slots: AtomicU64,
    pub users: Mutex<HashMap<String, User>>,
}

#[derive(Clone)]
pub struct MockPortalBackend(pub Arc<MockPortalBackendInner>);

impl MockPortalBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_upsert_user: AtomicU64::default(),
            calls_to_users: AtomicU64::default(),
            calls_to_find_user: AtomicU64::default(),
            calls_to_update_role: AtomicU64::default(),
            calls_to_book_appointment: AtomicU64::default(),
            calls_to_appointments: AtomicU64::default(),
            calls_to_available_slots: AtomicU64::default(),
            users: Mutex::default(),
        }
    }
}

impl MockPortalBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockPortalBackendInner::new()))
    }

    fn result<T>(&self, value: T) -> Result<T, String> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(value),
            false => Err("Supposed to fail".into()),
        }
    }
}

impl PortalBackend for MockPortalBackend {
    fn upsert_user(&self, _email: &str, _display_name: &str) -> Result<(), String> {
        self.0.calls_to_upsert_user.fetch_add(1, Ordering::SeqCst);
        self.result(())
    }

    fn users(&self) -> Result<Vec<User>, String> {
        self.0.calls_to_users.fetch_add(1, Ordering::SeqCst);
        let users = self.0.users.lock().unwrap().values().cloned().collect();
        self.result(users)
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, String> {
        self.0.calls_to_find_user.fetch_add(1, Ordering::SeqCst);
        let user = self.0.users.lock().unwrap().get(email).cloned();
        self.result(user)
    }

    fn update_role(&self, _email: &str, _role: Option<&str>) -> Result<RoleUpdate, String> {
        self.0.calls_to_update_role.fetch_add(1, Ordering::SeqCst);
        self.result(RoleUpdate {
            matched: true,
            modified: true,
        })
    }

    fn book_appointment(&self, _booking: NewBooking) -> Result<BookingOutcome, String> {
        self.0
            .calls_to_book_appointment
            .fetch_add(1, Ordering::SeqCst);
        self.result(BookingOutcome::Booked(Uuid::new_v4()))
    }

    fn appointments(&self, _email: &str, _date: &str) -> Result<Vec<Booking>, String> {
        self.0.calls_to_appointments.fetch_add(1, Ordering::SeqCst);
        self.result(vec![])
    }

    fn available_slots(&self) -> Result<Vec<Slot>, String> {
        self.0
            .calls_to_available_slots
            .fetch_add(1, Ordering::SeqCst);
        self.result(vec![])
    }
}

/// Verifier resolving every token to a fixed identity, or rejecting all
/// tokens when anonymous.
#[derive(Clone)]
pub struct MockTokenVerifier {
    identity: Arc<Mutex<Option<String>>>,
}

impl MockTokenVerifier {
    pub fn anonymous() -> Self {
        Self {
            identity: Arc::new(Mutex::new(None)),
        }
    }

    pub fn resolving(email: &str) -> Self {
        Self {
            identity: Arc::new(Mutex::new(Some(email.to_string()))),
        }
    }
}

impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, _token: &str) -> Result<String, String> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| "Supposed to fail".to_string())
    }
}

#[derive(Clone)]
pub struct MockPaymentGateway {
    pub success: Arc<AtomicBool>,
    pub calls: Arc<AtomicU64>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            success: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicU64::default()),
        }
    }
}

impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(
        &self,
        amount: u64,
        _currency: &str,
    ) -> Result<PaymentIntent, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.success.load(Ordering::SeqCst) {
            true => Ok(PaymentIntent {
                id: format!("pi_test_{amount}"),
                client_secret: format!("pi_test_{amount}_secret"),
            }),
            false => Err("Supposed to fail".into()),
        }
    }
}
