/// Why a client-supplied file name was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `..`.
    PathTraversal,
    /// Filename contains control characters, including NUL.
    ControlCharacter,
    /// Filename starts with a dot (hidden file).
    Hidden,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
///
/// Used for object names in asset URLs and for language template names.
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// Lower-cased extension of an uploaded file, if it is short and alphanumeric.
pub fn upload_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Fresh random object name keeping the upload's extension: `<uuid>.<ext>`.
pub fn random_object_name(file_name: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    match upload_extension(file_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_flat_filename_accepts_valid_names() {
        assert!(validate_flat_filename("cpp").is_ok());
        assert!(validate_flat_filename("3f2a.png").is_ok());
        assert_eq!(validate_flat_filename("  padded.txt  "), Ok("padded.txt"));
    }

    #[test]
    fn validate_flat_filename_rejects_bad_names() {
        assert_eq!(validate_flat_filename("   "), Err(FilenameError::Empty));
        assert_eq!(
            validate_flat_filename("a/b.png"),
            Err(FilenameError::ContainsPathSeparator)
        );
        assert_eq!(
            validate_flat_filename("a\\b.png"),
            Err(FilenameError::ContainsPathSeparator)
        );
        assert_eq!(validate_flat_filename(".."), Err(FilenameError::PathTraversal));
        assert_eq!(validate_flat_filename(".env"), Err(FilenameError::Hidden));
        assert_eq!(
            validate_flat_filename("a\r\nb"),
            Err(FilenameError::ControlCharacter)
        );
        assert_eq!(
            validate_flat_filename("a\0b"),
            Err(FilenameError::ControlCharacter)
        );
    }

    #[test]
    fn upload_extension_is_lowercased() {
        assert_eq!(upload_extension("Me.PNG").as_deref(), Some("png"));
        assert_eq!(upload_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(upload_extension("noext"), None);
        assert_eq!(upload_extension(".hidden"), None);
        assert_eq!(upload_extension("x.p?g"), None);
    }

    #[test]
    fn random_object_name_keeps_extension() {
        let name = random_object_name("photo.JPG");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 32 + 4);
        assert_ne!(name, random_object_name("photo.JPG"));
        assert!(!random_object_name("blob").contains('.'));
    }
}
