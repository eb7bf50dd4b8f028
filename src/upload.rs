//! Upload intake: validates a user-supplied file before it may enter the
//! workflow. A gate, not a transform.

use std::path::Path;

use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// Extension to MIME type, the formats the assessment service accepts.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Please select a valid image file (JPEG, PNG, or WebP)")]
    UnsupportedType,

    #[error("File size must be less than 10MB")]
    TooLarge { size: u64 },

    #[error("Could not read {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
}

/// A file that passed the intake gate, ready to be previewed and uploaded.
#[derive(Clone)]
pub struct ValidatedImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ValidatedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Check name and size against the accepted types and the 10 MiB cap.
/// Returns the MIME type the file will be uploaded as.
pub fn validate(file_name: &str, size: u64) -> Result<&'static str, IntakeError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or(IntakeError::UnsupportedType)?;

    let content_type = ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, mime)| *mime)
        .ok_or(IntakeError::UnsupportedType)?;

    if size > MAX_UPLOAD_BYTES {
        return Err(IntakeError::TooLarge { size });
    }

    Ok(content_type)
}

/// Validate a file on disk and read its bytes.
pub fn read_image(path: &Path) -> Result<ValidatedImage, IntakeError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let meta = std::fs::metadata(path).map_err(|source| IntakeError::Io {
        name: file_name.clone(),
        source,
    })?;
    let content_type = validate(&file_name, meta.len())?;

    let bytes = std::fs::read(path).map_err(|source| IntakeError::Io {
        name: file_name.clone(),
        source,
    })?;

    log::info!(
        "accepted {} ({}, {} bytes)",
        file_name,
        content_type,
        bytes.len()
    );

    Ok(ValidatedImage {
        file_name,
        content_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_each_supported_extension() {
        assert_eq!(validate("car.jpeg", 1024).unwrap(), "image/jpeg");
        assert_eq!(validate("car.jpg", 1024).unwrap(), "image/jpg");
        assert_eq!(validate("car.png", 1024).unwrap(), "image/png");
        assert_eq!(validate("car.webp", 1024).unwrap(), "image/webp");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(validate("CAR.JPG", 1024).unwrap(), "image/jpg");
    }

    #[test]
    fn rejects_unsupported_types() {
        assert!(matches!(
            validate("car.gif", 1024),
            Err(IntakeError::UnsupportedType)
        ));
        assert!(matches!(
            validate("car.pdf", 1024),
            Err(IntakeError::UnsupportedType)
        ));
        assert!(matches!(
            validate("noextension", 1024),
            Err(IntakeError::UnsupportedType)
        ));
    }

    #[test]
    fn rejects_files_over_ten_mib() {
        let size = 15 * 1024 * 1024;
        assert!(matches!(
            validate("car.png", size),
            Err(IntakeError::TooLarge { size: s }) if s == size
        ));
    }

    #[test]
    fn accepts_files_exactly_at_the_cap() {
        assert!(validate("car.jpg", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        let err = validate("car.gif", 1024).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a valid image file (JPEG, PNG, or WebP)"
        );
        let err = validate("car.png", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }
}
