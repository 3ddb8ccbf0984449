use crate::types::{Booking, NewBooking, Slot, User};
use uuid::Uuid;

/// Match/modify counts reported by a role update, mirroring the store's
/// conditional-update primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleUpdate {
    pub matched: bool,
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Uuid),
    SlotFull,
}

pub trait PortalBackend: Clone + Send + Sync + 'static {
    /// Creates or updates the profile stored under `email`. A stored role
    /// survives the upsert untouched.
    fn upsert_user(&self, email: &str, display_name: &str) -> Result<(), String>;
    fn users(&self) -> Result<Vec<User>, String>;
    fn find_user(&self, email: &str) -> Result<Option<User>, String>;
    /// Sets or clears the role of the user stored under `email` and reports
    /// whether a record matched and whether its value actually changed.
    fn update_role(&self, email: &str, role: Option<&str>) -> Result<RoleUpdate, String>;
    /// Atomically reserves a capacity unit on the named slot and, only if a
    /// unit was deducted, records the booking. Exhausted or unknown slots
    /// yield [`BookingOutcome::SlotFull`] without inserting anything.
    fn book_appointment(&self, booking: NewBooking) -> Result<BookingOutcome, String>;
    fn appointments(&self, email: &str, date: &str) -> Result<Vec<Booking>, String>;
    fn available_slots(&self) -> Result<Vec<Slot>, String>;
}
