//! Confirmation email composition.
//!
//! Builds the HTML confirmation sent to the patient after a booking is
//! created. Composition is pure so it can be tested without a mail relay.

use chrono::{Datelike, NaiveDate};
use clinibook_common::models::{Appointment, AppointmentType, Provider, User};

/// A composed email, ready for dispatch.
#[derive(Debug, Clone)]
pub struct ComposedEmail {
    pub subject: String,
    pub html_body: String,
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        MONTHS[date.month0() as usize],
        date.day(),
        date.year()
    )
}

fn meet_section(meet_link: &str) -> String {
    format!(
        "<div class=\"meet\">\
         <h3>Online Meeting</h3>\
         <p>Your appointment will be conducted via video conference:</p>\
         <p><a href=\"{meet_link}\">Join the meeting</a></p>\
         <p>Please test your camera and microphone before the appointment.</p>\
         </div>"
    )
}

/// Compose the booking confirmation for the patient.
pub fn appointment_confirmation(
    appointment: &Appointment,
    user: &User,
    provider: &Provider,
) -> ComposedEmail {
    let date_text = format_long_date(appointment.date);
    let kind_text = match appointment.kind {
        AppointmentType::Online => "Online",
        AppointmentType::InPerson => "In person",
    };
    let meet = appointment
        .google_meet_link
        .as_deref()
        .map(meet_section)
        .unwrap_or_default();
    let specialty = provider
        .specialty
        .as_deref()
        .unwrap_or("Clinical Psychology");

    let html_body = format!(
        "<html><body>\
         <h2>Appointment Confirmation</h2>\
         <p>Dear {patient},</p>\
         <p>Your appointment has been booked:</p>\
         <ul>\
         <li><strong>Date:</strong> {date_text}</li>\
         <li><strong>Time:</strong> {time}</li>\
         <li><strong>Type:</strong> {kind_text}</li>\
         <li><strong>Reason:</strong> {reason}</li>\
         <li><strong>Provider:</strong> {provider_name} ({specialty})</li>\
         </ul>\
         {meet}\
         <p>If you need to reschedule, reply to this email or contact {provider_email}.</p>\
         <p>Booking reference: {reference}</p>\
         </body></html>",
        patient = user.display_name(),
        time = appointment.time,
        reason = appointment.reason,
        provider_name = provider.display_name(),
        provider_email = provider.email,
        reference = appointment.id,
    );

    ComposedEmail {
        subject: format!("Appointment Confirmation - {date_text}"),
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clinibook_common::models::ProviderStatus;
    use uuid::Uuid;

    fn fixtures() -> (Appointment, User, Provider) {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Mia".to_string(),
            last_name: "Koch".to_string(),
            email: "mia@example.com".to_string(),
            phone: None,
        };
        let provider = Provider {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            specialty: Some("Child psychology".to_string()),
            description: None,
            calendar_id: "ana@group.calendar.google.com".to_string(),
            key_path: None,
            status: ProviderStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2099, 6, 15).unwrap(),
            time: "09:50".to_string(),
            kind: AppointmentType::Online,
            reason: "Initial consultation".to_string(),
            confirmed: false,
            cancelled: false,
            user_id: user.id,
            provider_id: provider.id,
            google_event_id: Some("evt_1".to_string()),
            google_meet_link: Some("https://meet.example.com/abc".to_string()),
            created_at: now,
            updated_at: now,
        };
        (appointment, user, provider)
    }

    #[test]
    fn test_subject_carries_long_date() {
        let (appointment, user, provider) = fixtures();
        let email = appointment_confirmation(&appointment, &user, &provider);
        assert_eq!(email.subject, "Appointment Confirmation - June 15, 2099");
    }

    #[test]
    fn test_body_includes_meet_link_for_online_booking() {
        let (appointment, user, provider) = fixtures();
        let email = appointment_confirmation(&appointment, &user, &provider);
        assert!(email.html_body.contains("https://meet.example.com/abc"));
        assert!(email.html_body.contains("Mia Koch"));
        assert!(email.html_body.contains("Ana Ruiz"));
    }

    #[test]
    fn test_body_omits_meet_section_without_link() {
        let (mut appointment, user, provider) = fixtures();
        appointment.kind = AppointmentType::InPerson;
        appointment.google_meet_link = None;

        let email = appointment_confirmation(&appointment, &user, &provider);
        assert!(!email.html_body.contains("video conference"));
        assert!(email.html_body.contains("In person"));
    }
}
