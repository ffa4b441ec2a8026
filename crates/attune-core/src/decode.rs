//! Decoding of structured model output with a caller-supplied fallback.
//!
//! Models asked for JSON do not always return it. Every decode site in
//! attune-core has a safe default, so a malformed reply is logged and
//! replaced rather than surfaced as an error.

use attune_types::error::ParseError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a model reply into `T`, falling back to `default()` on any failure.
///
/// The provider-parsed `structured` value is tried first. When it is absent,
/// `raw` is parsed directly after stripping a Markdown code fence, which some
/// models wrap around JSON even in JSON mode.
pub fn decode_or_default<T: DeserializeOwned>(
    structured: Option<Value>,
    raw: &str,
    default: impl FnOnce() -> T,
) -> T {
    match try_decode(structured, raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                error = %e,
                content_preview = %preview(raw, 200),
                "Failed to decode structured model output; using default"
            );
            default()
        }
    }
}

fn try_decode<T: DeserializeOwned>(structured: Option<Value>, raw: &str) -> Result<T, ParseError> {
    match structured {
        Some(value) => serde_json::from_value(value).map_err(|e| ParseError::Shape(e.to_string())),
        None => serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| ParseError::Json(e.to_string())),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        route: String,
        #[serde(default)]
        confidence: f64,
    }

    fn fallback() -> Shape {
        Shape {
            route: "chat".to_string(),
            confidence: 0.5,
        }
    }

    #[test]
    fn test_structured_value_wins() {
        let value = serde_json::json!({"route": "plan", "confidence": 0.9});
        let decoded = decode_or_default(Some(value), "garbage", fallback);
        assert_eq!(decoded.route, "plan");
    }

    #[test]
    fn test_raw_text_parsed_when_structured_absent() {
        let decoded = decode_or_default(None, r#"{"route":"emotional"}"#, fallback);
        assert_eq!(decoded.route, "emotional");
        assert_eq!(decoded.confidence, 0.0);
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = "```json\n{\"route\":\"coach\"}\n```";
        let decoded = decode_or_default(None, raw, fallback);
        assert_eq!(decoded.route, "coach");
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let value = serde_json::json!({"unexpected": true});
        assert_eq!(decode_or_default(Some(value), "", fallback), fallback());
    }

    #[test]
    fn test_unparseable_text_falls_back() {
        assert_eq!(decode_or_default(None, "I think chat?", fallback), fallback());
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("", 3), "");
    }
}
