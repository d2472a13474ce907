use core::fmt;

pub mod dish;
pub mod dto;
pub mod error;
pub mod reservation;
pub mod role;
pub mod token_claim;
pub mod user;
pub use dish::{Dish, DishCategory, NewDish};
pub use error::Error;
pub use reservation::{NewReservation, Reservation, ReservationStatus};
pub use role::Role;
pub use token_claim::TokenClaim;
pub use user::User;

/// Raised when a stored string does not map to a known enum variant.
#[derive(Debug)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value: {}", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}
