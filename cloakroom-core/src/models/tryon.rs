use serde::{Deserialize, Serialize};

use super::item::{ClothingItem, ItemId};
use super::owner::OwnerId;

/// Body of `POST /api/tryon/`. Absent selections are omitted from the JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TryOnRequest {
    pub user_id: OwnerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoes_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessory_id: Option<ItemId>,
}

impl TryOnRequest {
    /// Item ids carried by the request, in top/bottom/shoes/accessory order.
    pub fn item_ids(&self) -> Vec<ItemId> {
        [self.top_id, self.bottom_id, self.shoes_id, self.accessory_id]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Outcome of a generated try-on render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TryOnResult {
    pub outfit_id: i64,
    pub generated_image_url: String,
    #[serde(default)]
    pub message: String,
}

/// Response of `POST /api/upload/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub item: ClothingItem,
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_on_request_omits_empty_slots() {
        let req = TryOnRequest {
            user_id: OwnerId::new(1).unwrap(),
            top_id: Some(2),
            bottom_id: None,
            shoes_id: None,
            accessory_id: Some(5),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, serde_json::json!({"user_id": 1, "top_id": 2, "accessory_id": 5}));
        assert_eq!(req.item_ids(), vec![2, 5]);
    }

    #[test]
    fn test_health_status() {
        let ok: HealthStatus = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        let degraded: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(ok.is_ok());
        assert!(!degraded.is_ok());
    }
}
