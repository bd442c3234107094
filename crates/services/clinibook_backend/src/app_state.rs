//! Application state wiring.
//!
//! Builds the repository set, the optional external collaborators and the
//! booking orchestrator from configuration. Everything is injected as trait
//! objects; nothing below this layer knows which implementation it got.

use clinibook_common::services::BoxedError;
use clinibook_config::AppConfig;
use clinibook_db::{
    AppointmentRepository, DbClient, InMemoryAppointmentRepository,
    InMemoryProviderRepository, InMemoryUserRepository, ProviderRepository,
    SqlAppointmentRepository, SqlProviderRepository, SqlUserRepository, UserRepository,
};
use clinibook_gcal::{GoogleCalendarClient, StaticTokenProvider};
use clinibook_notify::HttpMailer;
use clinibook_scheduling::{AppointmentService, SharedCalendar, SharedNotifier};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state for the whole service.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<AppointmentService>,
    pub providers: Arc<dyn ProviderRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Present when a database is configured; used by the health check.
    pub db_client: Option<DbClient>,
}

/// Build the application state from configuration.
///
/// Without a database section the service runs on in-memory stores, which is
/// how the test and demo profiles operate. Calendar and notification
/// collaborators are attached only when configured and enabled.
pub async fn build_state(config: Arc<AppConfig>) -> Result<AppState, BoxedError> {
    let appointments: Arc<dyn AppointmentRepository>;
    let providers: Arc<dyn ProviderRepository>;
    let users: Arc<dyn UserRepository>;
    let db_client;

    if config.database.is_some() {
        let client = DbClient::new(&config).await.map_err(BoxedError::new)?;

        let appointment_repo = SqlAppointmentRepository::new(client.clone());
        let provider_repo = SqlProviderRepository::new(client.clone());
        let user_repo = SqlUserRepository::new(client.clone());

        appointment_repo
            .init_schema()
            .await
            .map_err(BoxedError::new)?;
        provider_repo.init_schema().await.map_err(BoxedError::new)?;
        user_repo.init_schema().await.map_err(BoxedError::new)?;

        appointments = Arc::new(appointment_repo);
        providers = Arc::new(provider_repo);
        users = Arc::new(user_repo);
        db_client = Some(client);
        info!("Using SQL repositories");
    } else {
        appointments = Arc::new(InMemoryAppointmentRepository::new());
        providers = Arc::new(InMemoryProviderRepository::new());
        users = Arc::new(InMemoryUserRepository::new());
        db_client = None;
        warn!("No database configured, using in-memory repositories");
    }

    let calendar = build_calendar(&config);
    let notifier = build_notifier(&config);

    let service = Arc::new(AppointmentService::new(
        appointments,
        providers.clone(),
        users.clone(),
        calendar,
        notifier,
        config.scheduling.clone(),
    ));

    Ok(AppState {
        config,
        service,
        providers,
        users,
        db_client,
    })
}

fn build_calendar(config: &AppConfig) -> Option<SharedCalendar> {
    if !config.use_calendar {
        return None;
    }

    let calendar_config = config.calendar.as_ref()?;
    let token_provider = match StaticTokenProvider::from_config(calendar_config) {
        Ok(provider) => Arc::new(provider),
        Err(err) => {
            warn!("Calendar sync disabled: {}", err);
            return None;
        }
    };

    match GoogleCalendarClient::new(calendar_config, token_provider) {
        Ok(client) => {
            info!("Calendar sync enabled");
            Some(Arc::new(client) as SharedCalendar)
        }
        Err(err) => {
            warn!("Calendar sync disabled: {}", err);
            None
        }
    }
}

fn build_notifier(config: &AppConfig) -> Option<SharedNotifier> {
    if !config.use_notify {
        return None;
    }

    let notify_config = config.notify.as_ref()?;
    match HttpMailer::new(notify_config.clone()) {
        Ok(mailer) => {
            info!("Email notifications enabled");
            Some(Arc::new(mailer) as SharedNotifier)
        }
        Err(err) => {
            warn!("Email notifications disabled: {}", err);
            None
        }
    }
}
