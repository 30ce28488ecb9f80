//! Wire shapes of the platform API payloads

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{IngestError, Result};

/// The part of `GET /users/{id}` the classifier looks at
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    /// Number of published tracks; absent or null for accounts without any
    #[serde(default, deserialize_with = "lenient_count")]
    pub track_count: Option<i64>,
}

/// Read a count field: integers and whole floats (`3.0`) count, anything else is absent
///
/// Shared by the user payload and follower records so both agree on who is an artist.
pub fn count_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(count_value(&Value::deserialize(deserializer)?))
}

impl UserPayload {
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(IngestError::decode("user payload is not a JSON object"));
        }
        serde_json::from_value(value).map_err(IngestError::from)
    }
}

/// One page of `GET /users/{id}/followers`
#[derive(Debug, Clone, Deserialize)]
pub struct FollowersPage {
    /// Raw follower records, normalized later
    pub collection: Vec<Value>,

    /// Cursor for the next page; null or empty once exhausted
    #[serde(default)]
    pub next_href: Option<String>,
}

impl FollowersPage {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(IngestError::from)
    }

    /// The continuation cursor, if traversal should go on
    pub fn cursor(&self) -> Option<&str> {
        self.next_href.as_deref().filter(|href| !href.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_payload_track_count() {
        let payload = UserPayload::from_value(json!({"id": 1, "track_count": 3})).unwrap();
        assert_eq!(payload.track_count, Some(3));

        let payload = UserPayload::from_value(json!({"id": 1})).unwrap();
        assert_eq!(payload.track_count, None);

        let payload = UserPayload::from_value(json!({"id": 1, "track_count": null})).unwrap();
        assert_eq!(payload.track_count, None);
    }

    #[test]
    fn test_user_payload_rejects_non_objects() {
        assert!(UserPayload::from_value(json!([1, 2])).is_err());
        assert!(UserPayload::from_value(json!("user")).is_err());
    }

    #[test]
    fn test_track_count_accepts_whole_floats() {
        let payload = UserPayload::from_value(json!({"track_count": 3.0})).unwrap();
        assert_eq!(payload.track_count, Some(3));

        let payload = UserPayload::from_value(json!({"track_count": 2.5})).unwrap();
        assert_eq!(payload.track_count, None);

        let payload = UserPayload::from_value(json!({"track_count": "many"})).unwrap();
        assert_eq!(payload.track_count, None);
    }

    #[test]
    fn test_count_value() {
        assert_eq!(count_value(&json!(7)), Some(7));
        assert_eq!(count_value(&json!(7.0)), Some(7));
        assert_eq!(count_value(&json!(0.5)), None);
        assert_eq!(count_value(&json!("7")), None);
        assert_eq!(count_value(&Value::Null), None);
    }

    #[test]
    fn test_followers_page_cursor() {
        let page = FollowersPage::from_value(json!({
            "collection": [{"id": 1}],
            "next_href": "https://api.example.com/users/1/followers?cursor=abc"
        }))
        .unwrap();
        assert_eq!(page.collection.len(), 1);
        assert_eq!(page.cursor(), Some("https://api.example.com/users/1/followers?cursor=abc"));

        let page = FollowersPage::from_value(json!({"collection": [], "next_href": null})).unwrap();
        assert_eq!(page.cursor(), None);

        let page = FollowersPage::from_value(json!({"collection": [], "next_href": ""})).unwrap();
        assert_eq!(page.cursor(), None);

        let page = FollowersPage::from_value(json!({"collection": []})).unwrap();
        assert_eq!(page.cursor(), None);
    }

    #[test]
    fn test_followers_page_requires_collection() {
        let err = FollowersPage::from_value(json!({"next_href": null})).unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }
}
