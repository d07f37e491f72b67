use serde::{Deserialize, Serialize};

use course_core::model::MIN_TITLE_CHARS;

use crate::error::{RequestError, UploadError};

/// Where the generator should take its source material from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Document,
}

/// How generated lessons are organised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStructure {
    #[default]
    Modular,
    Flexible,
    Difficulty,
    Practice,
    Paths,
}

/// Course generation form, serialized as the `data` part of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub input_type: InputType,
    #[serde(default)]
    pub topic: String,
    pub content_structure: ContentStructure,
    #[serde(rename = "outputFormat")]
    pub output_formats: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl CourseRequest {
    /// A text request with the default structure and a plain text output.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            input_type: InputType::Text,
            topic: String::new(),
            content_structure: ContentStructure::Modular,
            output_formats: vec!["text".to_string()],
            features: Vec::new(),
        }
    }

    /// Check the form before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` for a short title, no output format, or a
    /// document request without an upload.
    pub fn validate(&self, upload: Option<&Upload>) -> Result<(), RequestError> {
        if self.title.trim().chars().count() < MIN_TITLE_CHARS {
            return Err(RequestError::TitleTooShort);
        }
        if self.output_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(RequestError::NoOutputFormat);
        }
        if self.input_type == InputType::Document && upload.is_none() {
            return Err(RequestError::MissingDocument);
        }
        Ok(())
    }
}

/// Source document attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// Accepted file types and size limit for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    accepted: Vec<String>,
    max_size_mb: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(".pdf,.docx,.txt", 10)
    }
}

impl UploadPolicy {
    /// `accepted` is a comma separated list of extensions (`.pdf`) or MIME
    /// types (`application/pdf`).
    #[must_use]
    pub fn new(accepted: &str, max_size_mb: u32) -> Self {
        let accepted = accepted
            .split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            accepted,
            max_size_mb,
        }
    }

    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        u64::from(self.max_size_mb) * 1024 * 1024
    }

    /// # Errors
    ///
    /// Returns `UploadError::InvalidType` when neither the MIME type nor the
    /// extension is accepted, or `TooLarge` past the size limit.
    pub fn check(&self, upload: &Upload) -> Result<(), UploadError> {
        let mime = upload.mime_type.trim().to_ascii_lowercase();
        let ext = upload.extension();
        let accepted = self
            .accepted
            .iter()
            .any(|t| (!mime.is_empty() && *t == mime) || ext.as_deref() == Some(t.as_str()));
        if !accepted {
            return Err(UploadError::InvalidType {
                accepted: self.accepted.join(","),
            });
        }

        let size = u64::try_from(upload.bytes.len()).unwrap_or(u64::MAX);
        if size > self.max_size_bytes() {
            return Err(UploadError::TooLarge {
                max_mb: self.max_size_mb,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: &str, len: usize) -> Upload {
        Upload {
            file_name: name.to_string(),
            mime_type: mime.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn request_requires_title_and_output() {
        assert_eq!(
            CourseRequest::new("A").validate(None),
            Err(RequestError::TitleTooShort)
        );
        assert_eq!(
            CourseRequest::new("  A ").validate(None),
            Err(RequestError::TitleTooShort)
        );

        let mut request = CourseRequest::new("Rust");
        request.output_formats.clear();
        assert_eq!(request.validate(None), Err(RequestError::NoOutputFormat));

        assert!(CourseRequest::new("Rust").validate(None).is_ok());
    }

    #[test]
    fn document_input_needs_upload() {
        let mut request = CourseRequest::new("Rust");
        request.input_type = InputType::Document;
        assert_eq!(request.validate(None), Err(RequestError::MissingDocument));
        assert!(request.validate(Some(&upload("a.pdf", "", 1))).is_ok());
    }

    #[test]
    fn request_serializes_form_field_names() {
        let json = serde_json::to_value(CourseRequest::new("Rust")).unwrap();
        assert_eq!(json["inputType"], "text");
        assert_eq!(json["contentStructure"], "modular");
        assert_eq!(json["outputFormat"][0], "text");
    }

    #[test]
    fn policy_accepts_by_extension_or_mime() {
        let policy = UploadPolicy::default();
        assert!(policy.check(&upload("notes.TXT", "", 10)).is_ok());
        assert!(policy.check(&upload("scan", "application/pdf", 10)).is_err());

        let policy = UploadPolicy::new(".pdf, application/pdf", 1);
        assert!(policy.check(&upload("scan", "application/pdf", 10)).is_ok());
        assert_eq!(
            policy.check(&upload("image.png", "image/png", 10)),
            Err(UploadError::InvalidType {
                accepted: ".pdf,application/pdf".to_string()
            })
        );
    }

    #[test]
    fn policy_enforces_size_limit() {
        let policy = UploadPolicy::new(".txt", 1);
        assert!(policy.check(&upload("a.txt", "", 1024 * 1024)).is_ok());
        assert_eq!(
            policy.check(&upload("a.txt", "", 1024 * 1024 + 1)),
            Err(UploadError::TooLarge { max_mb: 1 })
        );
    }
}
