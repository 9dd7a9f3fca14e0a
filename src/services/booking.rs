use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::AppointmentStore;
use crate::errors::AppError;
use crate::models::{Appointment, ContactField, ContactForm, ConversationState, Session, Stage};
use crate::state::AppState;

pub const DATE_PROMPT: &str = "Sure! What date would you like to book the appointment for?";
pub const ORACLE_DOWN_REPLY: &str =
    "I'm having trouble reaching the assistant right now. Please try again in a moment.";

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{10,15}$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$").unwrap()
});

fn validate_contact(name: &str, email: &str, phone: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation(ContactField::Name, "Name is required."));
    }
    if !EMAIL.is_match(email.trim()) {
        return Err(AppError::validation(ContactField::Email, "Invalid email address."));
    }
    if !PHONE.is_match(phone) {
        return Err(AppError::validation(
            ContactField::Phone,
            "Invalid phone number format.",
        ));
    }
    Ok(())
}

fn parse_booking_date(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::validation(ContactField::Date, "Invalid date format. Use YYYY-MM-DD.")
    })
}

fn persist(
    store: &dyn AppointmentStore,
    name: &str,
    email: &str,
    phone: &str,
    date: NaiveDate,
) -> Result<Appointment, AppError> {
    let appointment = Appointment {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        phone: phone.to_string(),
        date,
    };

    store.append(&appointment).map_err(|e| {
        tracing::error!(error = %e, "failed to persist appointment");
        AppError::Persistence(e.to_string())
    })?;

    tracing::info!(date = %appointment.date, "appointment booked");
    Ok(appointment)
}

/// Validates every field and appends the appointment to `store`. Nothing is
/// written when any field is rejected.
pub fn submit_booking(
    store: &dyn AppointmentStore,
    name: &str,
    email: &str,
    phone: &str,
    date: &str,
) -> Result<Appointment, AppError> {
    validate_contact(name, email, phone)?;
    let date = parse_booking_date(date)?;
    persist(store, name, email, phone, date)
}

/// idle -> awaiting_date. Returns the prompt for a preferred date.
pub fn start_booking(conv: &mut ConversationState) -> String {
    conv.begin_booking();
    DATE_PROMPT.to_string()
}

/// Handles a reply while awaiting a date. On success the state moves to
/// awaiting_contact; on any failure it stays put and the user is re-prompted.
pub async fn handle_date_reply(
    state: &AppState,
    conv: &mut ConversationState,
    message: &str,
) -> String {
    match state.dates.resolve(message, state.today()).await {
        Ok(date) => {
            conv.confirm_date(date);
            format!(
                "Date confirmed: {}. Now, please provide your name, email and phone.",
                date.format("%Y-%m-%d")
            )
        }
        Err(AppError::DateParseFailure { query }) => format!(
            "I couldn't parse \"{query}\" as a date. Please try again with a clearer format."
        ),
        Err(e) => {
            tracing::warn!(error = %e, "date resolution unavailable");
            ORACLE_DOWN_REPLY.to_string()
        }
    }
}

pub fn confirmation_message(appointment: &Appointment) -> String {
    format!(
        "Appointment successfully booked!\n\n\
         Date: {}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}",
        appointment.date.format("%Y-%m-%d"),
        appointment.name,
        appointment.email,
        appointment.phone,
    )
}

/// awaiting_contact -> idle. A validation failure is also written to the
/// transcript and leaves the session where it was; a persistence failure
/// leaves the session untouched.
pub fn submit_contact(
    state: &AppState,
    session: &mut Session,
    form: &ContactForm,
) -> Result<Appointment, AppError> {
    let date = match (session.state.stage(), session.state.pending_date()) {
        (Stage::AwaitingContact, Some(date)) => date,
        _ => return Err(AppError::NoBookingInProgress),
    };

    let result = validate_contact(&form.name, &form.email, &form.phone).and_then(|()| {
        persist(
            state.store.as_ref(),
            &form.name,
            &form.email,
            &form.phone,
            date,
        )
    });

    match result {
        Ok(appointment) => {
            session.push_bot(&confirmation_message(&appointment));
            session.state.complete();
            Ok(appointment)
        }
        Err(e @ AppError::Validation { .. }) => {
            session.push_bot(&e.to_string());
            Err(e)
        }
        Err(e) => Err(e),
    }
}
