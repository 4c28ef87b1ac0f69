use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use crate::github::FileContent;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("content is served with unsupported encoding {0:?} (file too large?)")]
    UnsupportedEncoding(String),

    #[error("content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("content is not a valid package manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only part of package.json that decides a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: Option<String>,
}

/// Decode a contents-API body: base64 (GitHub wraps it at 60 columns),
/// then UTF-8, then JSON. A missing encoding is read as base64.
pub fn decode_manifest(file: &FileContent) -> Result<Manifest, ManifestError> {
    match file.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => return Err(ManifestError::UnsupportedEncoding(other.to_string())),
    }

    let compact: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
pub(crate) fn encode_manifest(json: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(json);
    // mimic the line wrapping of the contents API
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base64_file(content: String) -> FileContent {
        FileContent {
            content,
            encoding: Some("base64".to_string()),
        }
    }

    #[test]
    fn test_decode_wrapped_manifest() {
        let json = r#"{
  "name": "some-package-with-a-long-name",
  "version": "1.4.0",
  "description": "long enough to be wrapped across several base64 lines"
}"#;
        let encoded = encode_manifest(json);
        assert!(encoded.contains('\n'));
        let manifest = decode_manifest(&base64_file(encoded)).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.4.0"));
    }

    #[test]
    fn test_decode_manifest_without_version() {
        let manifest = decode_manifest(&base64_file(encode_manifest(r#"{"name": "x"}"#))).unwrap();
        assert_eq!(manifest.version, None);
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(matches!(
            decode_manifest(&base64_file("not base64 at all!".to_string())),
            Err(ManifestError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_manifest(&base64_file(encoded)),
            Err(ManifestError::Utf8(_))
        ));
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(
            decode_manifest(&base64_file(encode_manifest("{ not json"))),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn test_decode_without_declared_encoding() {
        let file = FileContent {
            content: encode_manifest(r#"{"version": "3.0.0"}"#),
            encoding: None,
        };
        assert_eq!(decode_manifest(&file).unwrap().version.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_decode_rejects_unencoded_large_file() {
        let file = FileContent {
            content: String::new(),
            encoding: Some("none".to_string()),
        };
        match decode_manifest(&file) {
            Err(ManifestError::UnsupportedEncoding(encoding)) => assert_eq!(encoding, "none"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
