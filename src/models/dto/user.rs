use serde::Deserialize;
use utoipa::ToSchema;

/// Fields are optional at the wire level so a missing one yields the
/// API's own 400 message instead of a body-deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
