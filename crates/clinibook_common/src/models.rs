// --- File: crates/clinibook_common/src/models.rs ---

// Shared entity models used across the scheduling core, storage layer and
// HTTP surface.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an appointment happens over video or at the practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Online,
    InPerson,
}

impl AppointmentType {
    /// Canonical lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Online => "online",
            AppointmentType::InPerson => "in_person",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "online" => Some(AppointmentType::Online),
            "in_person" => Some(AppointmentType::InPerson),
            _ => None,
        }
    }
}

/// A booked appointment slot.
///
/// `date` carries no time-of-day by construction: the normalization invariant
/// (any two requests on the same calendar day compare equal for conflict
/// purposes) is enforced by the type. `time` is always a zero-padded `HH:MM`
/// string, so string equality is slot equality.
///
/// `confirmed` and `cancelled` are independent flags, not one lifecycle enum;
/// an appointment can be both confirmed and cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub reason: String,
    pub confirmed: bool,
    pub cancelled: bool,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    /// Set only after a successful remote calendar event creation.
    pub google_event_id: Option<String>,
    /// Set only when an online meeting was provisioned.
    pub google_meet_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// An appointment occupies its slot only while not cancelled.
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }
}

/// Provider lifecycle. Providers are soft-deactivated, never hard-deleted,
/// to preserve historical appointment relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Active,
    Inactive,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Active => "active",
            ProviderStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ProviderStatus::Active),
            "inactive" => Some(ProviderStatus::Inactive),
            _ => None,
        }
    }
}

/// A care provider with an external calendar of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    /// Unique external-calendar identifier for this provider.
    pub calendar_id: String,
    /// Optional path to calendar-specific credentials.
    pub key_path: Option<String>,
    pub status: ProviderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A patient identity, validated externally and consumed by lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
