use serde::{Deserialize, Deserializer};

/// One discovered listing, as returned by the Topn DB API.
///
/// The upstream API is loose about its records: fields may be absent, null,
/// or carry numbers where the bot expects text. All of that is normalized
/// here, at the port boundary, so the formatter and delivery code can read
/// plain accessors and never branch on representation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "stringish")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub item_url: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    pub source: Option<String>,
}

impl Item {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("No title")
    }

    pub fn price(&self) -> &str {
        self.price.as_deref().unwrap_or("N/A")
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("N/A")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or("N/A")
    }

    pub fn item_url(&self) -> &str {
        self.item_url.as_deref().unwrap_or("#")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("Unknown source")
    }
}

/// Accepts a string, number, or boolean and yields it as text; null and
/// missing values become `None`.
pub(crate) fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let item: Item = serde_json::from_str("{}").expect("empty record");
        assert_eq!(item.title(), "No title");
        assert_eq!(item.price(), "N/A");
        assert_eq!(item.location(), "N/A");
        assert_eq!(item.item_url(), "#");
        assert_eq!(item.source(), "Unknown source");
        assert!(item.image_url().is_none());
    }

    #[test]
    fn numeric_price_is_normalized_to_text() {
        let item: Item =
            serde_json::from_str(r#"{"title": "Flat", "price": 2000}"#).expect("record");
        assert_eq!(item.price(), "2000");
    }

    #[test]
    fn empty_image_url_counts_as_absent() {
        let item: Item = serde_json::from_str(r#"{"image_url": ""}"#).expect("record");
        assert!(item.image_url().is_none());
    }
}
