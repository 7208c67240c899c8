use std::fs;
use std::path::Path;
use thiserror::Error;

/// Extension given to the label file that pairs with an image.
pub const LABEL_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads label files as opaque text. Box fields are never parsed, so two
/// files only match when their trimmed text is byte-for-byte equal.
pub struct AnnotationReader;

impl AnnotationReader {
    pub fn new() -> Self {
        Self
    }

    /// Return the file's content with leading and trailing whitespace removed.
    pub fn read(&self, file_path: &Path) -> Result<String, AnnotationError> {
        let content = fs::read_to_string(file_path)?;
        Ok(content.trim().to_string())
    }
}

impl Default for AnnotationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_trims_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.txt");
        fs::write(&file_path, "\n  0 0.5 0.5 0.1 0.1 \n\n").unwrap();

        let content = AnnotationReader::new().read(&file_path).unwrap();
        assert_eq!(content, "0 0.5 0.5 0.1 0.1");
    }

    #[test]
    fn test_inner_lines_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("multi.txt");
        fs::write(&file_path, "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.05 0.05\n").unwrap();

        let content = AnnotationReader::new().read(&file_path).unwrap();
        assert_eq!(content, "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.05 0.05");
    }

    #[test]
    fn test_float_formatting_not_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let short = temp_dir.path().join("short.txt");
        let long = temp_dir.path().join("long.txt");
        fs::write(&short, "0 0.5 0.5 0.1 0.1").unwrap();
        fs::write(&long, "0 0.50 0.50 0.10 0.10").unwrap();

        let reader = AnnotationReader::new();
        assert_ne!(reader.read(&short).unwrap(), reader.read(&long).unwrap());
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AnnotationReader::new().read(&temp_dir.path().join("missing.txt"));
        assert!(matches!(result, Err(AnnotationError::Io(_))));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("binary.txt");
        fs::write(&file_path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert!(AnnotationReader::new().read(&file_path).is_err());
    }
}
