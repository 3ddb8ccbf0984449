use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

/// A portal account, keyed by email. The role is only ever written through
/// the admin gate, never through the profile upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// A bookable time unit with its remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub space: i32,
}

/// A booking request as handed to the store. Extra fields supplied by the
/// caller travel along verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub slot_name: String,
    pub email: String,
    pub date: String,
    pub extra: Value,
}

/// A persisted booking. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    #[serde(rename = "name")]
    pub slot_name: String,
    pub email: String,
    pub date: String,
    #[serde(flatten)]
    pub extra: Value,
    pub created_at: DateTime<Utc>,
}
