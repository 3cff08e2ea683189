use std::fs;
use std::path::PathBuf;
use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
pub const UPLOADS_URL_PREFIX: &str = "/static/uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file part in request.")]
    NoFilePart,
    #[error("No file selected.")]
    NoFileSelected,
    #[error("Invalid file type. Please upload an image file.")]
    InvalidFileType,
    #[error("Failed to write upload {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Errors the user can fix by submitting a different file.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, UploadError::Io { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub path: PathBuf,
    pub size: usize,
}

pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Reduces a client-supplied name to a flat, ASCII-only file name.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    // decompose first so accented letters fold to their ASCII base
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let safe: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = safe.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn ensure_dir(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.dir).map_err(|source| UploadError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Checks the name a client submitted and returns the name it will be stored under.
    pub fn validate_name(original_name: &str) -> Result<String, UploadError> {
        if original_name.is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        if !allowed_file(original_name) {
            return Err(UploadError::InvalidFileType);
        }
        // sanitizing can strip the extension, e.g. a stem with no ASCII equivalent
        match sanitize_filename(original_name) {
            Some(name) if allowed_file(&name) => Ok(name),
            _ => Err(UploadError::InvalidFileType),
        }
    }

    /// Writes the upload, replacing any earlier file with the same sanitized name.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<UploadedImage, UploadError> {
        let file_name = Self::validate_name(original_name)?;
        let path = self.dir.join(&file_name);
        fs::write(&path, bytes).map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved upload {} ({} bytes)", path.display(), bytes.len());
        Ok(UploadedImage {
            file_name,
            path,
            size: bytes.len(),
        })
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn public_url(file_name: &str) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, urlencoding::encode(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        for name in ["a.png", "b.JPG", "c.Jpeg", "d.gif", "archive.tar.png"] {
            assert!(allowed_file(name), "{name} should be allowed");
        }
        for name in ["malware.exe", "png", "photo.", "photo.bmp", "photo.png.exe", ""] {
            assert!(!allowed_file(name), "{name} should be rejected");
        }
    }

    #[test]
    fn sanitize_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\sick hen.jpg").as_deref(),
            Some("C_Users_me_sick_hen.jpg")
        );
        assert_eq!(sanitize_filename("my <hen>.png").as_deref(), Some("my_hen.png"));
        assert_eq!(sanitize_filename("poulet_é.png").as_deref(), Some("poulet_e.png"));
        assert_eq!(sanitize_filename("ﬁche.jpg").as_deref(), Some("fiche.jpg"));
        assert_eq!(sanitize_filename("..."), None);
    }

    #[test]
    fn validate_name_reports_each_failure() {
        assert!(matches!(
            UploadStore::validate_name(""),
            Err(UploadError::NoFileSelected)
        ));
        assert!(matches!(
            UploadStore::validate_name("malware.exe"),
            Err(UploadError::InvalidFileType)
        ));
        assert!(matches!(
            UploadStore::validate_name("鸡.png"),
            Err(UploadError::InvalidFileType)
        ));
        assert_eq!(UploadStore::validate_name("ééé.png").unwrap(), "eee.png");
        assert_eq!(UploadStore::validate_name("hen 1.PNG").unwrap(), "hen_1.PNG");
    }

    #[test]
    fn public_url_points_at_uploads_prefix() {
        assert_eq!(UploadStore::public_url("hen.png"), "/static/uploads/hen.png");
    }

    #[test]
    fn save_overwrites_same_named_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().join("uploads");
        let store = UploadStore::new(&dir);
        store.ensure_dir().unwrap();

        store.save("hen.png", b"first").unwrap();
        let saved = store.save("hen.png", b"second").unwrap();

        assert_eq!(saved.path, dir.join("hen.png"));
        assert_eq!(saved.size, 6);
        assert_eq!(fs::read(&saved.path).unwrap(), b"second");
    }
}
