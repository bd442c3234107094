// --- File: crates/clinibook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://clinibook.db, loaded via CLINIBOOK_DATABASE__URL
}

// --- External Calendar Config ---
// Holds non-secret calendar config. The API token is loaded from the
// environment (CLINIBOOK_CALENDAR__API_TOKEN) or via env override.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarConfig {
    /// Base URL of the calendar API. Overridable for tests.
    #[serde(default = "default_calendar_api_base")]
    pub api_base: String,
    /// Fallback calendar when a provider has none of their own.
    pub default_calendar_id: Option<String>,
    pub api_token: Option<String>,
    /// Bounded timeout for remote calendar calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_calendar_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

// --- Notification Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// HTTP mail relay endpoint confirmations are posted to.
    pub relay_url: String,
    pub api_key: Option<String>,
    pub from_address: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// --- Scheduling Config ---
// Working hours and slot duration for availability computation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    #[serde(default = "default_work_start")]
    pub work_start: String,
    #[serde(default = "default_work_end")]
    pub work_end: String,
    #[serde(default = "default_slot_duration")]
    pub slot_duration_minutes: u16,
}

fn default_work_start() -> String {
    "09:00".to_string()
}

fn default_work_end() -> String {
    "18:00".to_string()
}

fn default_slot_duration() -> u16 {
    50
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            slot_duration_minutes: default_slot_duration(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_calendar: bool,
    #[serde(default)]
    pub use_notify: bool,

    // --- Optional sections ---
    pub database: Option<DatabaseConfig>,
    pub calendar: Option<CalendarConfig>,
    pub notify: Option<NotifyConfig>,

    #[serde(default)]
    pub scheduling: SchedulingConfig,
}
