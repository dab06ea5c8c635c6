//! Defensive parsing of extraction output
//!
//! Model replies are an untrusted boundary: they may wrap the JSON in code
//! fences, prefix it with prose, or not contain JSON at all. Parsing never
//! panics and degrades to `None` so callers can fall back to placeholders.

use busgo_core::BookingInfo;

/// Parse a model reply into booking info.
///
/// Strips Markdown code fences and any text surrounding the outermost JSON
/// object, then deserializes with every field nullable. Returns `None` when
/// no parseable object is present.
pub fn parse_booking_info(raw: &str) -> Option<BookingInfo> {
    let trimmed = raw.trim();

    let unfenced = trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_start_matches("json")
        .trim_end_matches("```")
        .trim();

    let candidate = extract_json_object(unfenced)?;

    match serde_json::from_str::<BookingInfo>(candidate) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(error = %e, "Extraction reply contained unparseable JSON");
            None
        }
    }
}

/// Slice out the outermost `{ ... }` span, if any
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_json() {
        let info = parse_booking_info(
            r#"{"name": "Jane Doe", "phone": "5551234567", "destination": "Boston",
                "travel_date": "2024-05-01", "seat_preference": "window"}"#,
        )
        .unwrap();
        assert_eq!(info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(info.destination.as_deref(), Some("Boston"));
        assert_eq!(info.seat_preference.as_deref(), Some("window"));
    }

    #[test]
    fn test_strips_code_fences() {
        let raw = "```json\n{\"name\": null, \"phone\": null, \"destination\": \"Boston\", \"travel_date\": null, \"seat_preference\": null}\n```";
        let info = parse_booking_info(raw).unwrap();
        assert!(info.name.is_none());
        assert_eq!(info.destination.as_deref(), Some("Boston"));
    }

    #[test]
    fn test_tolerates_surrounding_prose() {
        let raw = "Here are the details you asked for: {\"destination\": \"Boston\"} hope that helps!";
        let info = parse_booking_info(raw).unwrap();
        assert_eq!(info.destination.as_deref(), Some("Boston"));
        assert!(info.phone.is_none());
    }

    #[test]
    fn test_nulls_become_none() {
        let info = parse_booking_info(r#"{"name": null, "destination": null}"#).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn test_garbage_yields_none() {
        assert!(parse_booking_info("I could not find any details.").is_none());
        assert!(parse_booking_info("").is_none());
        assert!(parse_booking_info("{not json}").is_none());
        assert!(parse_booking_info("} {").is_none());
    }
}
