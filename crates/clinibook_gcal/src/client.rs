//! Google Calendar REST client.
//!
//! Implements `CalendarSync` against the Calendar v3 events API using plain
//! HTTP: event insert (optionally provisioning a Meet link through a
//! conference create request), update, delete and single-day listing. Every
//! call carries a bearer token and is bounded by the configured timeout.

use crate::auth::TokenProvider;
use crate::error::GcalError;
use chrono::{NaiveDate, TimeZone, Utc};
use clinibook_common::services::{
    BoxFuture, BoxedError, CalendarSync, DayEvent, EventCreation, EventDraft, EventUpdate,
};
use clinibook_config::CalendarConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

// --- Event payload (camelCase wire form) ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: &'static str,
}

#[derive(Serialize, Debug)]
struct ReminderOverride {
    method: &'static str,
    minutes: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Reminders {
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConferenceCreateRequest {
    request_id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConferenceRequest {
    create_request: ConferenceCreateRequest,
}

#[derive(Serialize, Debug)]
struct Attendee {
    email: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EventResource {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminders: Option<Reminders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conference_data: Option<ConferenceRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<Vec<Attendee>>,
}

// --- Event response ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EntryPoint {
    entry_point_type: Option<String>,
    uri: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConferenceResponse {
    #[serde(default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct EventTimeResponse {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventTimeResponse>,
    conference_data: Option<ConferenceResponse>,
}

#[derive(Deserialize, Debug)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<EventResponse>,
}

fn extract_meet_link(conference: Option<ConferenceResponse>) -> Option<String> {
    conference?
        .entry_points
        .into_iter()
        .find(|entry| entry.entry_point_type.as_deref() == Some("video"))
        .and_then(|entry| entry.uri)
}

fn build_event_resource(draft: &EventDraft, with_reminders: bool) -> EventResource {
    EventResource {
        summary: draft.summary.clone(),
        description: draft.description.clone(),
        start: EventTime {
            date_time: draft.start_time.clone(),
            time_zone: "UTC",
        },
        end: EventTime {
            date_time: draft.end_time.clone(),
            time_zone: "UTC",
        },
        reminders: with_reminders.then(|| Reminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email",
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup",
                    minutes: 30,
                },
            ],
        }),
        conference_data: draft.with_meet_link.then(|| ConferenceRequest {
            create_request: ConferenceCreateRequest {
                request_id: format!("meet-{}", Uuid::new_v4()),
            },
        }),
        attendees: draft
            .attendee_email
            .clone()
            .map(|email| vec![Attendee { email }]),
    }
}

/// REST implementation of `CalendarSync`.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl GoogleCalendarClient {
    pub fn new(
        config: &CalendarConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Result<Self, GcalError> {
        if config.api_base.is_empty() {
            return Err(GcalError::ConfigError);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_provider,
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.api_base, calendar_id)
    }

    async fn api_error(response: reqwest::Response) -> GcalError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        GcalError::ApiError {
            status: status.to_string(),
            message,
        }
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> Result<EventCreation, GcalError> {
        debug!("Creating calendar event '{}' in {}", draft.summary, calendar_id);

        let conference_version = if draft.with_meet_link { "1" } else { "0" };
        let body = build_event_resource(&draft, true);

        let response = self
            .client
            .post(self.events_url(calendar_id))
            .bearer_auth(self.token_provider.bearer_token()?)
            .query(&[
                ("conferenceDataVersion", conference_version),
                ("sendNotifications", "false"),
            ])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body_text = response.text().await?;
        let event: EventResponse = serde_json::from_str(&body_text)?;
        let creation = EventCreation {
            event_id: event.id,
            meet_link: extract_meet_link(event.conference_data),
        };

        info!(
            "Calendar event created: {:?}{}",
            creation.event_id,
            creation
                .meet_link
                .as_deref()
                .map(|link| format!(" with meeting {link}"))
                .unwrap_or_default()
        );
        Ok(creation)
    }

    async fn put_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: EventDraft,
    ) -> Result<EventUpdate, GcalError> {
        debug!("Updating calendar event {} in {}", event_id, calendar_id);

        let conference_version = if draft.with_meet_link { "1" } else { "0" };
        let body = build_event_resource(&draft, false);

        let response = self
            .client
            .put(format!("{}/{}", self.events_url(calendar_id), event_id))
            .bearer_auth(self.token_provider.bearer_token()?)
            .query(&[("conferenceDataVersion", conference_version)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body_text = response.text().await?;
        let event: EventResponse = serde_json::from_str(&body_text)?;
        Ok(EventUpdate {
            success: true,
            meet_link: extract_meet_link(event.conference_data),
        })
    }

    async fn remove_event(&self, calendar_id: &str, event_id: &str) -> Result<bool, GcalError> {
        debug!("Deleting calendar event {} from {}", event_id, calendar_id);

        let response = self
            .client
            .delete(format!("{}/{}", self.events_url(calendar_id), event_id))
            .bearer_auth(self.token_provider.bearer_token()?)
            .send()
            .await?;

        // An already-deleted event counts as gone.
        if response.status() == StatusCode::NOT_FOUND || response.status() == StatusCode::GONE {
            return Ok(true);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(true)
    }

    async fn list_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DayEvent>, GcalError> {
        let start_of_day = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end_of_day =
            Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).unwrap_or_default());

        let response = self
            .client
            .get(self.events_url(calendar_id))
            .bearer_auth(self.token_provider.bearer_token()?)
            .query(&[
                ("timeMin", start_of_day.to_rfc3339()),
                ("timeMax", end_of_day.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body_text = response.text().await?;
        let listing: EventListResponse = serde_json::from_str(&body_text)?;
        let events = listing
            .items
            .into_iter()
            .filter_map(|event| {
                let start = event.start.unwrap_or_default();
                let start_time = start.date_time.or(start.date)?;
                Some(DayEvent {
                    event_id: event.id?,
                    summary: event.summary,
                    start_time,
                })
            })
            .collect();

        Ok(events)
    }
}

impl CalendarSync for GoogleCalendarClient {
    type Error = BoxedError;

    fn create_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> BoxFuture<'_, EventCreation, Self::Error> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            self.insert_event(&calendar_id, draft)
                .await
                .map_err(BoxedError::new)
        })
    }

    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: EventDraft,
    ) -> BoxFuture<'_, EventUpdate, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.put_event(&calendar_id, &event_id, draft)
                .await
                .map_err(BoxedError::new)
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, bool, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.remove_event(&calendar_id, &event_id)
                .await
                .map_err(BoxedError::new)
        })
    }

    fn events_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            self.list_day(&calendar_id, date)
                .await
                .map_err(BoxedError::new)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(with_meet_link: bool) -> EventDraft {
        EventDraft {
            summary: "ONLINE Appointment - Mia Koch".to_string(),
            description: "Reason: Initial consultation".to_string(),
            start_time: "2099-06-15T09:00:00+00:00".to_string(),
            end_time: "2099-06-15T09:50:00+00:00".to_string(),
            attendee_email: Some("mia@example.com".to_string()),
            with_meet_link,
        }
    }

    #[test]
    fn test_event_resource_serializes_camel_case() {
        let resource = build_event_resource(&draft(true), true);
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["start"]["dateTime"], "2099-06-15T09:00:00+00:00");
        assert_eq!(json["start"]["timeZone"], "UTC");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["method"], "email");
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 1440);
        assert_eq!(json["reminders"]["overrides"][1]["minutes"], 30);
        assert_eq!(json["attendees"][0]["email"], "mia@example.com");
        assert!(json["conferenceData"]["createRequest"]["requestId"]
            .as_str()
            .unwrap()
            .starts_with("meet-"));
    }

    #[test]
    fn test_in_person_event_omits_conference_request() {
        let resource = build_event_resource(&draft(false), true);
        let json = serde_json::to_value(&resource).unwrap();
        assert!(json.get("conferenceData").is_none());
    }

    #[test]
    fn test_meet_link_extraction_picks_video_entry_point() {
        let event: EventResponse = serde_json::from_str(
            r#"{
                "id": "evt_123",
                "conferenceData": {
                    "entryPoints": [
                        {"entryPointType": "phone", "uri": "tel:+1-555-0100"},
                        {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            extract_meet_link(event.conference_data).as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn test_meet_link_absent_without_conference_data() {
        let event: EventResponse = serde_json::from_str(r#"{"id": "evt_123"}"#).unwrap();
        assert!(extract_meet_link(event.conference_data).is_none());
    }

    #[test]
    fn test_listing_tolerates_all_day_events_and_missing_ids() {
        let listing: EventListResponse = serde_json::from_str(
            r#"{
                "items": [
                    {"id": "evt_1", "summary": "Consult", "start": {"dateTime": "2099-06-15T09:00:00Z"}},
                    {"id": "evt_2", "start": {"date": "2099-06-15"}},
                    {"summary": "no id, dropped"}
                ]
            }"#,
        )
        .unwrap();

        let events: Vec<DayEvent> = listing
            .items
            .into_iter()
            .filter_map(|event| {
                let start = event.start.unwrap_or_default();
                let start_time = start.date_time.or(start.date)?;
                Some(DayEvent {
                    event_id: event.id?,
                    summary: event.summary,
                    start_time,
                })
            })
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, "evt_1");
        assert_eq!(events[1].start_time, "2099-06-15");
    }
}
