use chrono::{DateTime, NaiveDateTime};

use crate::domain::Item;

/// Characters Telegram's MarkdownV2 dialect requires a backslash in front of.
const MARKDOWN_V2_SPECIALS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes every MarkdownV2 special character with exactly one backslash.
///
/// Must be applied exactly once per user-supplied field; calling it twice
/// would escape the backslashes it just inserted.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_V2_SPECIALS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escapes and wraps user content in `*...*`. Empty input stays empty rather
/// than becoming a bare delimiter pair, which MarkdownV2 rejects.
pub fn bold(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("*{}*", escape_markdown_v2(text))
}

/// Renders one item as a MarkdownV2 message body.
pub fn format_item(item: &Item) -> String {
    let extras = Extras::parse(item.description());

    let mut text = format!(
        "📦 {title}\n\n💰 {price_label}: {price}\n📍 {location_label}: {location}\n🕒 {posted_label}: {posted}\n",
        title = bold(item.title()),
        price_label = bold("Price"),
        price = escape_markdown_v2(item.price()),
        location_label = bold("Location"),
        location = escape_markdown_v2(item.location()),
        posted_label = bold("Posted"),
        posted = format_posted(item.created_at()),
    );

    if let Some(price) = &extras.price {
        text.push_str(&format!(
            "💵 {}: {}\n",
            bold("Price"),
            escape_markdown_v2(price)
        ));
    }
    // A zero deposit is noise, not information.
    if let Some(deposit) = extras.deposit.as_deref().filter(|value| *value != "0") {
        text.push_str(&format!(
            "🔐 {}: {}\n",
            bold("Deposit"),
            escape_markdown_v2(deposit)
        ));
    }
    if let Some(pets) = extras.pets {
        text.push_str(&format!("🐾 {}: {}\n", bold("Pets"), pets));
    }
    if let Some(rent) = &extras.rent {
        text.push_str(&format!(
            "💳 {}: {}\n",
            bold("Additional rent"),
            escape_markdown_v2(rent)
        ));
    }

    text.push_str(&format!(
        "🔗 [View on {}]({})",
        escape_markdown_v2(item.source()),
        escape_markdown_v2(item.item_url())
    ));
    text
}

/// Splits an ISO-8601 timestamp into an escaped date and a bolded time.
/// Anything unparseable is shown escaped as-is.
fn format_posted(created_at: &str) -> String {
    if created_at.is_empty() || created_at == "N/A" {
        return "N/A".to_string();
    }
    match parse_iso(created_at) {
        Some(dt) => format!(
            "{} {} {}",
            escape_markdown_v2(&dt.format("%d.%m.%Y").to_string()),
            escape_markdown_v2("-"),
            bold(&dt.format("%H:%M").to_string())
        ),
        None => escape_markdown_v2(created_at),
    }
}

fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        // Keep the wall-clock time the backend reported.
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[derive(Debug, Default)]
struct Extras {
    price: Option<String>,
    deposit: Option<String>,
    pets: Option<&'static str>,
    rent: Option<String>,
}

impl Extras {
    /// Pulls the optional `key: value` lines out of an item description.
    /// Lines are separated by pipes or newlines depending on the scraper.
    fn parse(description: &str) -> Self {
        let mut extras = Self::default();
        for line in description.trim().split(['|', '\n']) {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("price:") {
                extras.price = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("deposit:") {
                extras.deposit = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("animals_allowed:") {
                extras.pets = match value.trim() {
                    "true" => Some("Allowed"),
                    "false" => Some("Not allowed"),
                    _ => None,
                };
            } else if let Some(value) = line.strip_prefix("rent:") {
                extras.rent = Some(value.trim().to_string());
            }
        }
        extras
    }
}
