use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UnknownVariant;

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i32,
    pub guest_name: String,
    pub email: String,
    pub number_of_guests: i32,
    pub date: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle states of a reservation. New reservations start as `Pending`;
/// only an admin moves them to `Confirmed` or `Cancelled`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReservationStatus::Pending),
            "Confirmed" => Ok(ReservationStatus::Confirmed),
            "Cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(UnknownVariant {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

/// A fully validated reservation, ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub guest_name: String,
    pub email: String,
    pub number_of_guests: i32,
    pub date: DateTime<Utc>,
    pub status: ReservationStatus,
}
