//! Request body schemas for the AI commands
//!
//! Bodies are read only after authorization, feature gating, and command
//! parsing have all passed. Each command has its own schema; validation
//! failures name the offending field so clients can fix the request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ai::binding::{JsonMap, MarkdownSource};
use crate::server::error::ApiError;

/// Maximum accepted length of a model identifier, checked before trimming
pub const MODEL_MAX_LEN: usize = 1_000_000;

/// Parses a JSON request body into the given schema
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::validation("body", e.to_string()))
}

/// Body of the `run` command
#[derive(Debug, Deserialize)]
pub struct RunBody {
    pub model: String,
    #[serde(default)]
    pub params: Option<JsonMap>,
    #[serde(default)]
    pub options: Option<JsonMap>,
}

/// A validated `run` request, with the model trimmed and optional maps
/// defaulted to empty
#[derive(Debug, PartialEq)]
pub struct ValidRun {
    pub model: String,
    pub params: JsonMap,
    pub options: JsonMap,
}

impl RunBody {
    /// Validates the body
    ///
    /// The length checks run against the raw model string; trimming happens
    /// afterwards, so surrounding whitespace neither rescues an oversized
    /// value nor fails an otherwise valid one.
    pub fn validate(self) -> Result<ValidRun, ApiError> {
        if self.model.is_empty() {
            return Err(ApiError::validation("model", "must not be empty"));
        }
        if self.model.chars().count() > MODEL_MAX_LEN {
            return Err(ApiError::validation(
                "model",
                format!("must be at most {} characters", MODEL_MAX_LEN),
            ));
        }

        Ok(ValidRun {
            model: self.model.trim().to_string(),
            params: self.params.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
        })
    }
}

/// Body of the `models` command
#[derive(Debug, Deserialize)]
pub struct ModelsBody {
    #[serde(default)]
    pub params: Option<JsonMap>,
}

/// Body of the `to-markdown` command
#[derive(Debug, Deserialize)]
pub struct MarkdownBody {
    pub files: FilesField,
    #[serde(default)]
    pub options: Option<JsonMap>,
}

/// The `files` field accepts either a single file object or an array of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FilesField {
    Many(Vec<MarkdownFileBody>),
    One(MarkdownFileBody),
}

/// One file submitted for markdown conversion, blob base64-encoded
#[derive(Debug, Deserialize)]
pub struct MarkdownFileBody {
    pub name: String,
    pub blob: String,
}

impl MarkdownBody {
    /// Validates the body and decodes the file blobs
    pub fn validate(self) -> Result<(Vec<MarkdownSource>, JsonMap), ApiError> {
        let files = match self.files {
            FilesField::Many(files) => files,
            FilesField::One(file) => vec![file],
        };

        let sources = files
            .into_iter()
            .map(|file| {
                let blob = STANDARD.decode(&file.blob).map_err(|e| {
                    ApiError::validation(
                        "files",
                        format!("file '{}' has an invalid base64 blob: {}", file.name, e),
                    )
                })?;
                Ok(MarkdownSource {
                    name: file.name,
                    blob,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok((sources, self.options.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_body(model: &str) -> RunBody {
        RunBody {
            model: model.to_string(),
            params: None,
            options: None,
        }
    }

    #[test]
    fn test_run_empty_model_rejected() {
        let err = run_body("").validate().unwrap_err();
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, "model"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_model_length_boundary() {
        let at_limit = "a".repeat(MODEL_MAX_LEN);
        assert!(run_body(&at_limit).validate().is_ok());

        let over_limit = "a".repeat(MODEL_MAX_LEN + 1);
        assert!(run_body(&over_limit).validate().is_err());
    }

    #[test]
    fn test_run_model_is_trimmed_after_checks() {
        let valid = run_body("  gpt  ").validate().unwrap();
        assert_eq!(valid.model, "gpt");

        // Whitespace-only survives the non-empty check and trims to ""
        let valid = run_body("   ").validate().unwrap();
        assert_eq!(valid.model, "");
    }

    #[test]
    fn test_run_optional_maps_default_to_empty() {
        let valid = run_body("gpt").validate().unwrap();
        assert!(valid.params.is_empty());
        assert!(valid.options.is_empty());
    }

    #[test]
    fn test_parse_body_names_missing_fields() {
        let err = parse_body::<RunBody>(br#"{"params": {}}"#).unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_parse_body_rejects_empty_body() {
        assert!(parse_body::<ModelsBody>(b"").is_err());
        assert!(parse_body::<ModelsBody>(b"{}").is_ok());
    }

    #[test]
    fn test_markdown_single_file_form() {
        let body: MarkdownBody = parse_body(
            serde_json::to_vec(&json!({
                "files": { "name": "doc.pdf", "blob": "aGVsbG8=" }
            }))
            .unwrap()
            .as_slice(),
        )
        .unwrap();

        let (files, options) = body.validate().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "doc.pdf");
        assert_eq!(files[0].blob, b"hello");
        assert!(options.is_empty());
    }

    #[test]
    fn test_markdown_array_form() {
        let body: MarkdownBody = parse_body(
            serde_json::to_vec(&json!({
                "files": [
                    { "name": "a.txt", "blob": "YQ==" },
                    { "name": "b.txt", "blob": "Yg==" }
                ],
                "options": { "gateway": { "id": "g1" } }
            }))
            .unwrap()
            .as_slice(),
        )
        .unwrap();

        let (files, options) = body.validate().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].blob, b"a");
        assert_eq!(files[1].blob, b"b");
        assert_eq!(options["gateway"]["id"], "g1");
    }

    #[test]
    fn test_markdown_invalid_base64_names_the_file() {
        let body: MarkdownBody = parse_body(
            serde_json::to_vec(&json!({
                "files": { "name": "doc.pdf", "blob": "not base64!!!" }
            }))
            .unwrap()
            .as_slice(),
        )
        .unwrap();

        let err = body.validate().unwrap_err();
        assert!(err.to_string().contains("doc.pdf"));
    }

    #[test]
    fn test_markdown_missing_blob_rejected() {
        let result = parse_body::<MarkdownBody>(
            serde_json::to_vec(&json!({
                "files": { "name": "doc.pdf" }
            }))
            .unwrap()
            .as_slice(),
        );

        assert!(result.is_err());
    }
}
