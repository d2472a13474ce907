use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{NewReservation, Reservation, ReservationStatus};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex");
}

/// Raw reservation fields from the client. `validate` collects every
/// constraint violation so the client sees all of them at once. The date
/// arrives as a plain string and is parsed during validation, so a
/// malformed one gets its own 400 message instead of a body-rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    pub guest_name: Option<String>,
    pub email: Option<String>,
    pub number_of_guests: Option<i32>,
    pub date: Option<String>,
}

impl ReservationPayload {
    pub fn validate(self) -> Result<NewReservation, Vec<String>> {
        let mut messages = Vec::new();

        let guest_name = match self.guest_name.map(|s| s.trim().to_owned()) {
            Some(name) if !name.is_empty() => Some(name),
            _ => {
                messages.push("Guest name is required.".to_owned());
                None
            }
        };
        let email = match self.email.map(|s| s.trim().to_owned()) {
            Some(email) if !email.is_empty() => {
                if EMAIL_RE.is_match(&email) {
                    Some(email)
                } else {
                    messages.push("Invalid email format.".to_owned());
                    None
                }
            }
            _ => {
                messages.push("Email is required.".to_owned());
                None
            }
        };
        let number_of_guests = match self.number_of_guests {
            Some(n) if n >= 1 => Some(n),
            Some(_) => {
                messages.push("Number of guests must be at least 1.".to_owned());
                None
            }
            None => {
                messages.push("Number of guests is required.".to_owned());
                None
            }
        };
        let date = match self.date.as_deref() {
            Some(raw) => match raw.parse::<DateTime<Utc>>() {
                Ok(date) => Some(date),
                Err(_) => {
                    messages.push("Invalid reservation date.".to_owned());
                    None
                }
            },
            None => {
                messages.push("Reservation date is required.".to_owned());
                None
            }
        };

        match (guest_name, email, number_of_guests, date) {
            (Some(guest_name), Some(email), Some(number_of_guests), Some(date))
                if messages.is_empty() =>
            {
                Ok(NewReservation {
                    guest_name,
                    email,
                    number_of_guests,
                    date,
                    status: ReservationStatus::default(),
                })
            }
            _ => Err(messages),
        }
    }
}

/// Admin-side status change. The status arrives as a plain string so the
/// handler can answer with a 400 instead of a body-rejection when it falls
/// outside the enum.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: i32,
    pub guest_name: String,
    pub email: String,
    pub number_of_guests: i32,
    pub date: String,
    pub status: ReservationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            guest_name: reservation.guest_name,
            email: reservation.email,
            number_of_guests: reservation.number_of_guests,
            date: reservation.date.to_rfc3339(),
            status: reservation.status,
            created_at: reservation.created_at.to_rfc3339(),
            updated_at: reservation.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> ReservationPayload {
        ReservationPayload {
            guest_name: Some("Ana".to_owned()),
            email: Some("ana@example.com".to_owned()),
            number_of_guests: Some(1),
            date: Some("2026-09-01T19:30:00Z".to_owned()),
        }
    }

    #[test]
    fn one_guest_is_accepted_and_starts_pending() {
        let reservation = valid_payload().validate().unwrap();
        assert_eq!(reservation.number_of_guests, 1);
        assert_eq!(reservation.status, ReservationStatus::Pending);
    }

    #[test]
    fn zero_guests_is_rejected() {
        let payload = ReservationPayload {
            number_of_guests: Some(0),
            ..valid_payload()
        };
        let messages = payload.validate().unwrap_err();
        assert_eq!(
            messages,
            vec!["Number of guests must be at least 1.".to_owned()]
        );
    }

    #[test]
    fn unparseable_date_is_rejected_with_its_own_message() {
        let payload = ReservationPayload {
            date: Some("tomorrow".to_owned()),
            ..valid_payload()
        };
        let messages = payload.validate().unwrap_err();
        assert_eq!(messages, vec!["Invalid reservation date.".to_owned()]);
    }

    #[test]
    fn offset_date_forms_are_accepted() {
        let payload = ReservationPayload {
            date: Some("2026-09-01T19:30:00+02:00".to_owned()),
            ..valid_payload()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let payload = ReservationPayload {
            email: Some("not-an-email".to_owned()),
            ..valid_payload()
        };
        let messages = payload.validate().unwrap_err();
        assert_eq!(messages, vec!["Invalid email format.".to_owned()]);
    }

    #[test]
    fn empty_payload_reports_every_missing_field() {
        let messages = ReservationPayload::default().validate().unwrap_err();
        assert_eq!(
            messages,
            vec![
                "Guest name is required.".to_owned(),
                "Email is required.".to_owned(),
                "Number of guests is required.".to_owned(),
                "Reservation date is required.".to_owned(),
            ]
        );
    }

    #[test]
    fn plausible_addresses_pass_the_format_check() {
        for email in ["guest@example.com", "a.b-c@mail.example.org"] {
            let payload = ReservationPayload {
                email: Some(email.to_owned()),
                ..valid_payload()
            };
            assert!(payload.validate().is_ok(), "{email} should be accepted");
        }
    }
}
