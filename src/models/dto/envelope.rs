use serde::Serialize;
use utoipa::ToSchema;

/// List responses: `{success, count, data: [...]}`.
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Single-record responses: `{success, data, message?}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Failure responses: `{success: false, error}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: &str) -> Self {
        Self {
            success: false,
            error: error.to_owned(),
        }
    }
}

/// Bare acknowledgement used by the auth endpoints, which carry their
/// credential in a cookie rather than the body.
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_counts_its_records() {
        let body = serde_json::to_value(ListEnvelope::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body, json!({"success": true, "count": 3, "data": [1, 2, 3]}));
    }

    #[test]
    fn empty_list_envelope_has_zero_count() {
        let body = serde_json::to_value(ListEnvelope::<i32>::new(vec![])).unwrap();
        assert_eq!(body, json!({"success": true, "count": 0, "data": []}));
    }

    #[test]
    fn data_envelope_omits_an_absent_message() {
        let body = serde_json::to_value(DataEnvelope::new(json!({}))).unwrap();
        assert_eq!(body, json!({"success": true, "data": {}}));

        let body =
            serde_json::to_value(DataEnvelope::with_message(json!({}), "Deleted.")).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "data": {}, "message": "Deleted."})
        );
    }

    #[test]
    fn error_envelope_is_marked_unsuccessful() {
        let body = serde_json::to_value(ErrorEnvelope::new("nope")).unwrap();
        assert_eq!(body, json!({"success": false, "error": "nope"}));
    }
}
