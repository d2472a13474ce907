pub mod dish;
pub mod envelope;
pub mod message;
pub mod reservation;
pub mod user;
pub use dish::*;
pub use envelope::*;
pub use message::Message;
pub use reservation::*;
pub use user::*;

use crate::models::{DishCategory, ReservationStatus};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            Message,
            Ack,
            ErrorEnvelope,
            LoginInfo,
            RegisterInfo,
            DishPayload,
            DishResponse,
            DishCategory,
            ReservationPayload,
            ReservationResponse,
            ReservationStatus,
            StatusUpdate,
        ),
    ),
    modifiers(&SecurityAddon)
)]
/// Captures OpenAPI schemas and canned responses defined in the DTO module
pub struct OpenApiSchemas;

pub struct SecurityAddon;
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components: &mut utoipa::openapi::Components = openapi.components.as_mut().unwrap(); // we can unwrap safely since there already is components registered.
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}
