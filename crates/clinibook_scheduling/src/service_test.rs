#[cfg(test)]
mod tests {
    use crate::dto::{CreateAppointmentInput, UpdateAppointmentInput};
    use crate::service::{AppointmentService, SharedCalendar, SharedNotifier};
    use chrono::NaiveDate;
    use clinibook_common::models::{AppointmentType, Provider, ProviderStatus, User};
    use clinibook_common::services::{
        BoxFuture, BoxedError, CalendarSync, DayEvent, EventCreation, EventDraft, EventUpdate,
        NotificationResult, Notifier,
    };
    use clinibook_common::BookingError;
    use clinibook_config::SchedulingConfig;
    use clinibook_db::{
        InMemoryAppointmentRepository, InMemoryProviderRepository, InMemoryUserRepository,
        NewProvider, NewUser, ProviderRepository, UserRepository,
    };
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn remote_error() -> BoxedError {
        BoxedError::new(std::io::Error::other("remote service unavailable"))
    }

    #[derive(Default)]
    struct MockCalendar {
        fail_create: bool,
        fail_listing: bool,
        day_events: Vec<DayEvent>,
        update_meet_link: Option<String>,
        created: Mutex<Vec<(String, EventDraft)>>,
        updated: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    impl CalendarSync for MockCalendar {
        type Error = BoxedError;

        fn create_event(
            &self,
            calendar_id: &str,
            draft: EventDraft,
        ) -> BoxFuture<'_, EventCreation, Self::Error> {
            let calendar_id = calendar_id.to_string();
            Box::pin(async move {
                if self.fail_create {
                    return Err(remote_error());
                }
                let with_meet_link = draft.with_meet_link;
                self.created.lock().unwrap().push((calendar_id, draft));
                Ok(EventCreation {
                    event_id: Some("evt_123".to_string()),
                    meet_link: with_meet_link
                        .then(|| "https://meet.example.com/abc".to_string()),
                })
            })
        }

        fn update_event(
            &self,
            _calendar_id: &str,
            event_id: &str,
            _draft: EventDraft,
        ) -> BoxFuture<'_, EventUpdate, Self::Error> {
            let event_id = event_id.to_string();
            Box::pin(async move {
                self.updated.lock().unwrap().push(event_id);
                Ok(EventUpdate {
                    success: true,
                    meet_link: self.update_meet_link.clone(),
                })
            })
        }

        fn delete_event(
            &self,
            _calendar_id: &str,
            event_id: &str,
        ) -> BoxFuture<'_, bool, Self::Error> {
            let event_id = event_id.to_string();
            Box::pin(async move {
                self.deleted.lock().unwrap().push(event_id);
                Ok(true)
            })
        }

        fn events_for_day(
            &self,
            _calendar_id: &str,
            _date: NaiveDate,
        ) -> BoxFuture<'_, Vec<DayEvent>, Self::Error> {
            Box::pin(async move {
                if self.fail_listing {
                    return Err(remote_error());
                }
                Ok(self.day_events.clone())
            })
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for MockNotifier {
        type Error = BoxedError;

        fn send_email(
            &self,
            to: &str,
            subject: &str,
            _body: &str,
            _is_html: bool,
        ) -> BoxFuture<'_, NotificationResult, Self::Error> {
            let to = to.to_string();
            let subject = subject.to_string();
            Box::pin(async move {
                if self.fail {
                    return Err(remote_error());
                }
                self.sent.lock().unwrap().push((to, subject));
                Ok(NotificationResult {
                    id: "msg_1".to_string(),
                    status: "queued".to_string(),
                })
            })
        }
    }

    struct Harness {
        service: Arc<AppointmentService>,
        user: User,
        provider: Provider,
    }

    async fn harness(
        calendar: Option<SharedCalendar>,
        notifier: Option<SharedNotifier>,
    ) -> Harness {
        let appointments = Arc::new(InMemoryAppointmentRepository::new());
        let providers = Arc::new(InMemoryProviderRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());

        let user = users
            .insert(NewUser {
                first_name: "Mia".to_string(),
                last_name: "Koch".to_string(),
                email: "mia@example.com".to_string(),
                phone: Some("+41790000000".to_string()),
            })
            .await
            .expect("seed user");

        let provider = providers
            .insert(NewProvider {
                first_name: "Ana".to_string(),
                last_name: "Ruiz".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
                specialty: Some("Clinical psychology".to_string()),
                description: None,
                calendar_id: "ana@group.calendar.google.com".to_string(),
                key_path: None,
            })
            .await
            .expect("seed provider");

        let service = Arc::new(AppointmentService::new(
            appointments,
            providers,
            users,
            calendar,
            notifier,
            SchedulingConfig::default(),
        ));

        Harness {
            service,
            user,
            provider,
        }
    }

    fn booking(harness: &Harness, date: NaiveDate, time: &str) -> CreateAppointmentInput {
        CreateAppointmentInput {
            date,
            time: time.to_string(),
            kind: AppointmentType::Online,
            reason: "Initial consultation".to_string(),
            user_id: harness.user.id,
            provider_id: harness.provider.id,
        }
    }

    fn future_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 6, 15).unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_mirrors_and_notifies() {
        let calendar = Arc::new(MockCalendar::default());
        let notifier = Arc::new(MockNotifier::default());
        let h = harness(Some(calendar.clone()), Some(notifier.clone())).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "9:00"))
            .await
            .expect("create");

        // Time is normalized before it reaches the store.
        assert_eq!(created.time, "09:00");
        assert_eq!(created.google_event_id.as_deref(), Some("evt_123"));
        assert_eq!(
            created.google_meet_link.as_deref(),
            Some("https://meet.example.com/abc")
        );

        let mirrored = calendar.created.lock().unwrap();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].0, h.provider.calendar_id);
        assert!(mirrored[0].1.with_meet_link);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, h.user.email);
    }

    #[tokio::test]
    async fn test_in_person_booking_requests_no_meet_link() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar.clone()), None).await;

        let mut input = booking(&h, future_date(), "10:40");
        input.kind = AppointmentType::InPerson;

        let created = h.service.create(input).await.expect("create");
        assert!(created.google_meet_link.is_none());
        assert!(!calendar.created.lock().unwrap()[0].1.with_meet_link);
    }

    #[tokio::test]
    async fn test_create_rejects_past_date() {
        let h = harness(None, None).await;
        let yesterday = chrono::Utc::now().date_naive().pred_opt().unwrap();

        let err = h
            .service
            .create(booking(&h, yesterday, "09:00"))
            .await
            .expect_err("past date must fail");

        assert!(matches!(err, BookingError::PastDate));
        assert_eq!(
            err.to_string(),
            "Cannot create appointments on past dates"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_parties() {
        let h = harness(None, None).await;

        let mut input = booking(&h, future_date(), "09:00");
        input.user_id = Uuid::new_v4();
        assert!(matches!(
            h.service.create(input).await,
            Err(BookingError::NotFound(_))
        ));

        let mut input = booking(&h, future_date(), "09:00");
        input.provider_id = Uuid::new_v4();
        assert!(matches!(
            h.service.create(input).await,
            Err(BookingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_deactivated_provider() {
        let providers = Arc::new(InMemoryProviderRepository::new());
        let provider = providers
            .insert(NewProvider {
                first_name: "Eva".to_string(),
                last_name: "Meier".to_string(),
                email: "eva@example.com".to_string(),
                phone: None,
                specialty: None,
                description: None,
                calendar_id: "eva@group.calendar.google.com".to_string(),
                key_path: None,
            })
            .await
            .unwrap();
        providers
            .set_status(provider.id, ProviderStatus::Inactive)
            .await
            .unwrap();

        let users = Arc::new(InMemoryUserRepository::new());
        let user = users
            .insert(NewUser {
                first_name: "Mia".to_string(),
                last_name: "Koch".to_string(),
                email: "mia2@example.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();

        let service = AppointmentService::new(
            Arc::new(InMemoryAppointmentRepository::new()),
            providers,
            users,
            None,
            None,
            SchedulingConfig::default(),
        );

        let err = service
            .create(CreateAppointmentInput {
                date: future_date(),
                time: "09:00".to_string(),
                kind: AppointmentType::Online,
                reason: "Checkup".to_string(),
                user_id: user.id,
                provider_id: provider.id,
            })
            .await
            .expect_err("inactive provider must fail");

        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_slot_conflicts_and_names_provider() {
        let h = harness(None, None).await;

        h.service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .expect("first booking");

        let err = h
            .service
            .create(booking(&h, future_date(), "9:00"))
            .await
            .expect_err("same normalized slot must conflict");

        match err {
            BookingError::Conflict(message) => assert!(message.contains("Ana Ruiz")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_bookings_yield_one_winner() {
        let h = harness(None, None).await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = h.service.clone();
            let input = booking(&h, future_date(), "11:30");
            handles.push(tokio::spawn(async move { service.create(input).await }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.expect("join") {
                Ok(_) => successes += 1,
                Err(BookingError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 3);
    }

    #[tokio::test]
    async fn test_calendar_failure_does_not_fail_booking() {
        let calendar = Arc::new(MockCalendar {
            fail_create: true,
            ..Default::default()
        });
        let notifier = Arc::new(MockNotifier::default());
        let h = harness(Some(calendar), Some(notifier.clone())).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .expect("booking must survive calendar outage");

        assert!(created.google_event_id.is_none());
        assert!(created.google_meet_link.is_none());
        // The confirmation email still goes out.
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_booking() {
        let notifier = Arc::new(MockNotifier {
            fail: true,
            ..Default::default()
        });
        let h = harness(None, Some(notifier)).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .expect("booking must survive notifier outage");

        assert!(h.service.get(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_confirm_is_idempotent() {
        let h = harness(None, None).await;
        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let confirmed = h.service.confirm(created.id).await.expect("confirm");
        assert!(confirmed.confirmed);

        let again = h.service.confirm(created.id).await.expect("re-confirm");
        assert!(again.confirmed);
        assert_eq!(again.updated_at, confirmed.updated_at);
    }

    #[tokio::test]
    async fn test_cancel_frees_slot_and_clears_mirror_fields() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar.clone()), None).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();
        assert!(created.google_event_id.is_some());

        let cancelled = h.service.cancel(created.id).await.expect("cancel");
        assert!(cancelled.cancelled);
        assert!(cancelled.google_event_id.is_none());
        assert!(cancelled.google_meet_link.is_none());
        assert_eq!(
            calendar.deleted.lock().unwrap().as_slice(),
            &["evt_123".to_string()]
        );

        // Cancelling again is a no-op and triggers no second remote delete.
        let again = h.service.cancel(created.id).await.expect("re-cancel");
        assert!(again.cancelled);
        assert_eq!(calendar.deleted.lock().unwrap().len(), 1);

        // The freed slot is bookable again.
        h.service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .expect("rebook freed slot");
    }

    #[tokio::test]
    async fn test_cancelling_a_confirmed_appointment_keeps_both_flags() {
        let h = harness(None, None).await;
        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        h.service.confirm(created.id).await.unwrap();
        let cancelled = h.service.cancel(created.id).await.unwrap();

        assert!(cancelled.confirmed);
        assert!(cancelled.cancelled);
        assert!(!cancelled.is_active());
    }

    #[tokio::test]
    async fn test_update_moves_slot_with_conflict_guard() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar.clone()), None).await;

        let first = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();
        h.service
            .create(booking(&h, future_date(), "09:50"))
            .await
            .unwrap();

        // Moving onto an occupied slot conflicts.
        let err = h
            .service
            .update(
                first.id,
                UpdateAppointmentInput {
                    time: Some("09:50".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("occupied slot");
        assert!(matches!(err, BookingError::Conflict(_)));

        // Re-saving the same slot does not conflict with itself. The edited
        // reason is still pushed to the remote event.
        let same = h
            .service
            .update(
                first.id,
                UpdateAppointmentInput {
                    reason: Some("Follow-up".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("self-update");
        assert_eq!(same.reason, "Follow-up");
        assert_eq!(calendar.updated.lock().unwrap().len(), 1);

        // Moving to a free slot succeeds and pushes a second remote update.
        let moved = h
            .service
            .update(
                first.id,
                UpdateAppointmentInput {
                    time: Some("10:40".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("move");
        assert_eq!(moved.time, "10:40");
        assert_eq!(
            calendar.updated.lock().unwrap().as_slice(),
            &["evt_123".to_string(), "evt_123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_without_material_change_skips_remote_event() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar.clone()), None).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        // Confirming through the generic update touches nothing the remote
        // event shows.
        h.service
            .update(
                created.id,
                UpdateAppointmentInput {
                    confirmed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("confirm via update");
        assert!(calendar.updated.lock().unwrap().is_empty());

        // Re-sending the stored reason verbatim is not a change either.
        h.service
            .update(
                created.id,
                UpdateAppointmentInput {
                    reason: Some("Initial consultation".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("no-op reason");
        assert!(calendar.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_refreshed_meeting_link() {
        let calendar = Arc::new(MockCalendar {
            update_meet_link: Some("https://meet.example.com/new".to_string()),
            ..Default::default()
        });
        let h = harness(Some(calendar), None).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();
        assert_eq!(
            created.google_meet_link.as_deref(),
            Some("https://meet.example.com/abc")
        );

        let moved = h
            .service
            .update(
                created.id,
                UpdateAppointmentInput {
                    time: Some("10:40".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("move");

        assert_eq!(
            moved.google_meet_link.as_deref(),
            Some("https://meet.example.com/new")
        );
        let stored = h.service.get(created.id).await.unwrap();
        assert_eq!(
            stored.google_meet_link.as_deref(),
            Some("https://meet.example.com/new")
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_record_and_remote_event() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar.clone()), None).await;

        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let removed = h.service.remove(created.id).await.expect("remove");
        assert_eq!(removed.id, created.id);
        assert_eq!(calendar.deleted.lock().unwrap().len(), 1);

        assert!(matches!(
            h.service.get(created.id).await,
            Err(BookingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_available_slots_reduce_grid_by_bookings_and_remote_events() {
        let calendar = Arc::new(MockCalendar {
            day_events: vec![DayEvent {
                event_id: "evt_remote".to_string(),
                summary: None,
                start_time: "2099-06-15T09:50:00+00:00".to_string(),
            }],
            ..Default::default()
        });
        let h = harness(Some(calendar), None).await;

        h.service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let slots = h
            .service
            .available_slots(h.provider.id, future_date())
            .await
            .expect("slots");

        assert_eq!(slots.len(), 9);
        assert!(!slots.contains(&"09:00".to_string()));
        assert!(!slots.contains(&"09:50".to_string()));
        assert_eq!(slots.first().map(String::as_str), Some("10:40"));
        assert_eq!(slots.last().map(String::as_str), Some("17:20"));
    }

    #[tokio::test]
    async fn test_available_slots_degrade_when_listing_fails() {
        let calendar = Arc::new(MockCalendar {
            fail_listing: true,
            ..Default::default()
        });
        let h = harness(Some(calendar), None).await;

        h.service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let slots = h
            .service
            .available_slots(h.provider.id, future_date())
            .await
            .expect("listing failure must not fail availability");

        // Stored bookings still apply; only the remote overlay is missing.
        assert_eq!(slots.len(), 10);
        assert!(!slots.contains(&"09:00".to_string()));
    }

    #[tokio::test]
    async fn test_available_slots_for_past_date_are_empty() {
        let calendar = Arc::new(MockCalendar::default());
        let h = harness(Some(calendar), None).await;

        let yesterday = chrono::Utc::now().date_naive().pred_opt().unwrap();
        let slots = h
            .service
            .available_slots(h.provider.id, yesterday)
            .await
            .expect("past day");
        assert!(slots.is_empty());

        // The guard is strict: today still has its full grid.
        let today = chrono::Utc::now().date_naive();
        let slots = h
            .service
            .available_slots(h.provider.id, today)
            .await
            .expect("today");
        assert_eq!(slots.len(), 11);
    }

    #[tokio::test]
    async fn test_view_attaches_user_and_provider_records() {
        let h = harness(None, None).await;
        let created = h
            .service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let view = h.service.view(created.clone()).await.expect("view");
        assert_eq!(view.appointment.id, created.id);
        assert_eq!(view.user.email, h.user.email);
        assert_eq!(view.provider.display_name(), "Ana Ruiz");

        // Appointment fields stay at the top level; the parties are nested.
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "online");
        assert_eq!(json["time"], "09:00");
        assert_eq!(json["user"]["email"], "mia@example.com");
        assert_eq!(json["provider"]["last_name"], "Ruiz");
    }

    #[tokio::test]
    async fn test_views_populate_a_listing_in_order() {
        let h = harness(None, None).await;
        h.service
            .create(booking(&h, future_date(), "09:50"))
            .await
            .unwrap();
        h.service
            .create(booking(&h, future_date(), "09:00"))
            .await
            .unwrap();

        let listing = h.service.list_all().await.unwrap();
        let views = h.service.views(listing.clone()).await.expect("views");

        assert_eq!(views.len(), 2);
        for (view, appointment) in views.iter().zip(&listing) {
            assert_eq!(view.appointment.id, appointment.id);
            assert_eq!(view.user.id, h.user.id);
            assert_eq!(view.provider.id, h.provider.id);
        }
        assert_eq!(views[0].appointment.time, "09:00");
    }

    #[tokio::test]
    async fn test_available_slots_for_unknown_provider_fail() {
        let h = harness(None, None).await;
        assert!(matches!(
            h.service.available_slots(Uuid::new_v4(), future_date()).await,
            Err(BookingError::NotFound(_))
        ));
    }
}
