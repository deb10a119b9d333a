use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Message used when a failure carries no usable description
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze receipt";

/// Image encodings accepted by the inference providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MimeType {
    Png,
    #[default]
    Jpeg,
}

impl MimeType {
    /// Derive the MIME type from a locator's suffix.
    ///
    /// A case-insensitive `.png` suffix selects PNG; everything else,
    /// including locators without an extension, is treated as JPEG.
    pub fn from_locator(locator: &str) -> Self {
        if locator.to_ascii_lowercase().ends_with(".png") {
            MimeType::Png
        } else {
            MimeType::Jpeg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
        }
    }
}

/// An image handed over by the host platform (camera or gallery)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Opaque URI or path of the image
    pub locator: String,
    pub mime_type: MimeType,
    /// Base64 encoding of the image bytes, absent when the host did not provide it
    pub encoded_payload: Option<String>,
}

impl CapturedImage {
    pub fn new(locator: impl Into<String>, encoded_payload: Option<String>) -> Self {
        let locator = locator.into();
        CapturedImage {
            mime_type: MimeType::from_locator(&locator),
            locator,
            encoded_payload,
        }
    }

    /// Build an image from raw bytes, encoding them as standard base64
    pub fn from_bytes(locator: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(locator, Some(STANDARD.encode(bytes)))
    }

    /// The payload, if present and non-empty
    pub fn payload(&self) -> Option<&str> {
        self.encoded_payload
            .as_deref()
            .filter(|payload| !payload.is_empty())
    }
}

/// A recipe suggested by the model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: String,
    /// Receipt items this recipe consumes
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_items: Vec<String>,
}

/// Models sometimes emit `null` for an empty field; read it as the empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The renderable outcome of one receipt analysis.
///
/// Whenever `error_message` is set, `items` and `recipes` are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipes: Vec<Recipe>,
    /// Model text kept for diagnostics when it could not be parsed
    #[serde(default, alias = "rawResponse", skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// An error result with empty sequences
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        };

        AnalysisResult {
            error_message: Some(message),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Blank error strings count as no error; a real error empties the sequences.
    fn normalized(mut self) -> Self {
        if self
            .error_message
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            self.error_message = None;
        }
        if self.error_message.is_some() {
            self.items.clear();
            self.recipes.clear();
        }
        self
    }
}

/// Exhaustive result of one analysis call before it is flattened for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The reply was well-formed JSON of the expected shape
    Parsed(AnalysisResult),
    /// The provider answered with text that is not JSON of the expected shape
    ParseFailure { provider: String, raw_text: String },
    /// Configuration, transport or provider failure
    Failure(String),
}

impl From<AnalysisOutcome> for AnalysisResult {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Parsed(result) => result.normalized(),
            AnalysisOutcome::ParseFailure { provider, raw_text } => AnalysisResult {
                raw_text: Some(raw_text),
                error_message: Some(format!("Failed to parse {} response as JSON", provider)),
                ..Default::default()
            },
            AnalysisOutcome::Failure(message) => AnalysisResult::failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_suffix_is_case_insensitive() {
        assert_eq!(MimeType::from_locator("receipt.png"), MimeType::Png);
        assert_eq!(MimeType::from_locator("file:///tmp/RECEIPT.PNG"), MimeType::Png);
        assert_eq!(MimeType::from_locator("scan.Png"), MimeType::Png);
    }

    #[test]
    fn test_everything_else_is_jpeg() {
        assert_eq!(MimeType::from_locator("receipt.jpg"), MimeType::Jpeg);
        assert_eq!(MimeType::from_locator("receipt"), MimeType::Jpeg);
        assert_eq!(MimeType::from_locator(""), MimeType::Jpeg);
        assert_eq!(MimeType::from_locator("receipt.png.heic"), MimeType::Jpeg);
        assert_eq!(MimeType::Jpeg.as_str(), "image/jpeg");
        assert_eq!(MimeType::Png.as_str(), "image/png");
    }

    #[test]
    fn test_captured_image_from_bytes() {
        let image = CapturedImage::from_bytes("/tmp/r.PNG", b"hello");
        assert_eq!(image.mime_type, MimeType::Png);
        assert_eq!(image.payload(), Some("aGVsbG8="));

        let empty = CapturedImage::new("r.jpg", Some(String::new()));
        assert_eq!(empty.payload(), None);
    }

    #[test]
    fn test_deserialize_model_reply() {
        let json = r#"{
            "items": ["milk", "eggs"],
            "recipes": [{
                "name": "Omelette",
                "ingredients": ["eggs", "milk"],
                "instructions": "Whisk and fry.",
                "usedItems": ["eggs"]
            }]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.items, vec!["milk", "eggs"]);
        assert_eq!(result.recipes[0].used_items, vec!["eggs"]);
        assert!(result.error_message.is_none());
        assert!(result.raw_text.is_none());
    }

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let result: AnalysisResult = serde_json::from_str(r#"{"recipes":[{"name":"Toast"}]}"#).unwrap();
        assert!(result.items.is_empty());
        assert!(result.recipes[0].ingredients.is_empty());
        assert!(result.recipes[0].used_items.is_empty());
    }

    #[test]
    fn test_null_sequences_read_as_empty() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"items":null,"recipes":[{"name":"Latte","ingredients":null,"instructions":null,"usedItems":null}]}"#,
        )
        .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.recipes[0].name, "Latte");
        assert!(result.recipes[0].ingredients.is_empty());
        assert!(result.recipes[0].instructions.is_empty());
        assert!(result.recipes[0].used_items.is_empty());

        let result: AnalysisResult = serde_json::from_str(r#"{"recipes":null}"#).unwrap();
        assert!(result.recipes.is_empty());
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"rawResponse":"text","error":"boom"}"#).unwrap();
        assert_eq!(result.raw_text.as_deref(), Some("text"));
        assert_eq!(result.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_serializes_camel_case_without_empty_options() {
        let result = AnalysisResult {
            items: vec!["bread".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"items":["bread"],"recipes":[]}"#);

        let failed = AnalysisResult::failure("nope");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["errorMessage"], "nope");
    }

    #[test]
    fn test_parse_failure_collapses_with_raw_text() {
        let result: AnalysisResult = AnalysisOutcome::ParseFailure {
            provider: "Claude".to_string(),
            raw_text: "I couldn't read this receipt.".to_string(),
        }
        .into();

        assert!(result.items.is_empty());
        assert!(result.recipes.is_empty());
        assert_eq!(result.raw_text.as_deref(), Some("I couldn't read this receipt."));
        assert_eq!(
            result.error_message.as_deref(),
            Some("Failed to parse Claude response as JSON")
        );
    }

    #[test]
    fn test_failure_with_blank_message_uses_fallback() {
        let result: AnalysisResult = AnalysisOutcome::Failure("  ".to_string()).into();
        assert_eq!(result.error_message.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[test]
    fn test_parsed_error_empties_sequences() {
        let parsed: AnalysisResult =
            serde_json::from_str(r#"{"items":["milk"],"recipes":[{"name":"x"}],"error":"not a receipt"}"#)
                .unwrap();
        let result: AnalysisResult = AnalysisOutcome::Parsed(parsed).into();

        assert!(result.items.is_empty());
        assert!(result.recipes.is_empty());
        assert_eq!(result.error_message.as_deref(), Some("not a receipt"));
    }

    #[test]
    fn test_parsed_blank_error_is_dropped() {
        let parsed: AnalysisResult =
            serde_json::from_str(r#"{"items":["milk"],"recipes":[],"error":""}"#).unwrap();
        let result: AnalysisResult = AnalysisOutcome::Parsed(parsed).into();

        assert_eq!(result.items, vec!["milk"]);
        assert!(!result.is_error());
    }
}
