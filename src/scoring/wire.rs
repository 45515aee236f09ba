// Wire form of a scoring request, shared by the HTTP API and `vericheck batch`.
//
//   { "type": "url" | "text" | "job", "data": "...", "email"?: "..." }
//
// Decoding never fails on field shape. An unrecognized or non-string type,
// or a `data` value that isn't a JSON string, turns into the neutral
// passthrough. A non-string email is treated as absent.

use serde::{Deserialize, Deserializer};

use super::engine::{ContentType, ScoreInput};

#[derive(Debug, Deserialize, Default)]
pub struct ScanRequest {
    #[serde(rename = "type", default, deserialize_with = "string_or_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
}

/// Accept any JSON value; keep it only if it is a string.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl ScanRequest {
    /// Split into the engine input and the (non-blank) email.
    pub fn into_parts(self) -> (ScoreInput, Option<String>) {
        let declared = self.content_type.unwrap_or_default();
        let input = match self.data {
            serde_json::Value::String(content) => {
                ScoreInput::new(ContentType::parse(&declared), content)
            }
            // Content that isn't text can't go through a real branch,
            // whatever type was declared.
            _ => ScoreInput::new(ContentType::Other(declared), String::new()),
        };
        let email = self.email.filter(|e| !e.trim().is_empty());
        (input, email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> (ScoreInput, Option<String>) {
        serde_json::from_value::<ScanRequest>(body)
            .unwrap()
            .into_parts()
    }

    #[test]
    fn test_string_data_keeps_declared_type() {
        let (input, email) = parse(json!({ "type": "url", "data": "https://x.io" }));
        assert_eq!(input.content_type, ContentType::Url);
        assert_eq!(input.content, "https://x.io");
        assert_eq!(email, None);
    }

    #[test]
    fn test_missing_data_is_passthrough() {
        let (input, _) = parse(json!({ "type": "text" }));
        assert_eq!(input.content_type, ContentType::Other("text".into()));
        assert!(input.content.is_empty());
    }

    #[test]
    fn test_null_data_is_passthrough() {
        let (input, _) = parse(json!({ "type": "url", "data": null }));
        assert_eq!(input.content_type, ContentType::Other("url".into()));
    }

    #[test]
    fn test_missing_type_is_passthrough() {
        let (input, _) = parse(json!({ "data": "hello" }));
        assert_eq!(input.content_type, ContentType::Other(String::new()));
    }

    #[test]
    fn test_non_string_type_is_passthrough() {
        let (input, _) = parse(json!({ "type": 5, "data": "http://x.io" }));
        assert_eq!(input.content_type, ContentType::Other(String::new()));

        let (input, _) = parse(json!({ "type": ["url"], "data": "http://x.io" }));
        assert_eq!(input.content_type, ContentType::Other(String::new()));
    }

    #[test]
    fn test_json_line_with_odd_fields_decodes() {
        let request: ScanRequest =
            serde_json::from_str(r#"{"type": 5, "data": "hi", "email": false}"#).unwrap();
        let (input, email) = request.into_parts();
        assert_eq!(input.content_type, ContentType::Other(String::new()));
        assert_eq!(input.content, "hi");
        assert_eq!(email, None);
    }

    #[test]
    fn test_non_string_email_ignored() {
        let (input, email) = parse(json!({ "type": "text", "data": "hello", "email": 42 }));
        assert_eq!(input.content_type, ContentType::Text);
        assert_eq!(email, None);

        let (_, email) = parse(json!({ "type": "text", "data": "hello", "email": { "a": 1 } }));
        assert_eq!(email, None);
    }

    #[test]
    fn test_blank_email_ignored() {
        let (_, email) = parse(json!({ "type": "text", "data": "x", "email": "  " }));
        assert_eq!(email, None);
        let (_, email) = parse(json!({ "type": "text", "data": "x", "email": "a@b.c" }));
        assert_eq!(email.as_deref(), Some("a@b.c"));
    }
}
