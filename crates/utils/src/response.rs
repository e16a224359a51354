use serde::{Deserialize, Serialize};

/// Standard JSON envelope returned by every API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

/// Page of results plus the metadata callers need to build "has more"
/// indicators. `total` counts the filtered set before pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, skip: u64, limit: u64) -> Self {
        let has_more = skip + (items.len() as u64) < total;
        Self {
            items,
            total,
            skip,
            limit,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_message() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(json.get("data").and_then(|v| v.as_i64()), Some(42));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn error_envelope_carries_message_only() {
        let json = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(json.get("message").and_then(|v| v.as_str()), Some("boom"));
        assert!(json.get("data").is_none());
    }

    #[test]
    fn has_more_reflects_remaining_rows() {
        let page = Paginated::new(vec![1, 2], 5, 0, 2);
        assert!(page.has_more);
        let last = Paginated::new(vec![5], 5, 4, 2);
        assert!(!last.has_more);
    }
}
