use serde::{Deserialize, Deserializer};

use super::stringish;

/// A user's standing subscription to a source URL.
///
/// Owned by the remote repository; the worker only ever holds a read-only
/// snapshot for the duration of one reconciliation cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringTask {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "chat_key")]
    pub chat_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "stringish")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub last_got_item: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub created_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// Chat ids arrive as strings from some endpoints and as integers from others.
fn chat_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(stringish(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_chat_id_is_accepted() {
        let task: MonitoringTask =
            serde_json::from_str(r#"{"id": 7, "chat_id": 12345, "name": "flats"}"#)
                .expect("task record");
        assert_eq!(task.chat_id, "12345");
        assert!(task.is_active);
    }
}
