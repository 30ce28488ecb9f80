//! Raw follower record -> [`FollowerProfile`]
//!
//! Field mapping:
//!
//! | raw field         | profile field    |
//! |-------------------|------------------|
//! | `id`              | `external_id`    |
//! | `followers_count` | `follower_count` |
//! | `avatar_url`      | `avatar_url`     |
//! | `full_name`       | `display_name`   |
//! | `city`            | `city`           |
//! | `country_code`    | `country_code`   |
//!
//! Every field must be present. The text fields may be `null`; the id and
//! follower count may not. `is_artist` is true when `track_count` is present
//! and at least one.

use serde_json::{Map, Value};

use super::classifier::status_for;
use super::models::count_value;
use scgraph_common::types::{AccountId, FollowerProfile};
use scgraph_common::{GraphError, Result};

pub fn normalize(raw: &Value) -> Result<FollowerProfile> {
    let record = raw
        .as_object()
        .ok_or_else(|| GraphError::invalid_field("record", "is not a JSON object"))?;

    Ok(FollowerProfile {
        external_id: account_id(record)?,
        avatar_url: optional_text(record, "avatar_url")?,
        display_name: optional_text(record, "full_name")?,
        follower_count: follower_count(record)?,
        city: optional_text(record, "city")?,
        country_code: optional_text(record, "country_code")?,
        is_artist: status_for(record.get("track_count").and_then(count_value)).is_artist(),
    })
}

fn required<'r>(record: &'r Map<String, Value>, field: &str) -> Result<&'r Value> {
    record
        .get(field)
        .ok_or_else(|| GraphError::missing_field(field))
}

fn account_id(record: &Map<String, Value>) -> Result<AccountId> {
    match required(record, "id")? {
        Value::Number(n) => n
            .as_i64()
            .map(AccountId::new)
            .ok_or_else(|| GraphError::invalid_field("id", "is not an integer")),
        Value::String(s) => s
            .parse()
            .map_err(|_| GraphError::invalid_field("id", "is not a numeric string")),
        _ => Err(GraphError::invalid_field("id", "must be a number or numeric string")),
    }
}

fn follower_count(record: &Map<String, Value>) -> Result<i64> {
    match required(record, "followers_count")?.as_i64() {
        Some(count) if count >= 0 => Ok(count),
        Some(_) => Err(GraphError::invalid_field("followers_count", "is negative")),
        None => Err(GraphError::invalid_field(
            "followers_count",
            "must be a non-negative integer",
        )),
    }
}

fn optional_text(record: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match required(record, field)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(GraphError::invalid_field(field, "must be a string or null")),
    }
}
