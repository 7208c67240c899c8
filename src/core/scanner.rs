use crate::core::annotation::LABEL_EXTENSION;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

const IMAGES_DIR: &str = "images";
const LABELS_DIR: &str = "labels";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// Splits in the order they are walked.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `images/` and `labels/` directories of one split under a dataset root.
#[derive(Debug, Clone)]
pub struct SplitLayout {
    pub split: Split,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl SplitLayout {
    pub fn new(root: &Path, split: Split) -> Self {
        let split_dir = root.join(split.as_str());
        Self {
            split,
            images_dir: split_dir.join(IMAGES_DIR),
            labels_dir: split_dir.join(LABELS_DIR),
        }
    }

    /// A split only counts when both halves exist.
    pub fn is_present(&self) -> bool {
        self.images_dir.is_dir() && self.labels_dir.is_dir()
    }

    /// `images/foo.jpg` pairs with `labels/foo.txt`, whether or not that file exists.
    pub fn annotation_path(&self, image_path: &Path) -> PathBuf {
        let file_name = image_path.file_name().unwrap_or_default();
        self.labels_dir
            .join(file_name)
            .with_extension(LABEL_EXTENSION)
    }
}

/// An image and the label path derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    pub split: Split,
    pub image: PathBuf,
    pub annotation: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SplitScan {
    pub split: Split,
    pub pairs: Vec<SamplePair>,
}

/// Enumerates image/label pairs for every split present under a dataset root.
pub struct ScannerService {
    supported_formats: HashSet<String>,
}

impl ScannerService {
    pub fn new() -> Self {
        let supported_formats = IMAGE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect();
        Self { supported_formats }
    }

    pub fn is_supported_format(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_formats.contains(&ext))
    }

    /// Walk `train`, `val` and `test` in that order, skipping any split that
    /// lacks `images/` or `labels/`.
    pub fn scan_dataset(&self, root: &Path) -> Vec<SplitScan> {
        Split::ALL
            .iter()
            .filter_map(|&split| self.scan_split(root, split))
            .collect()
    }

    pub fn scan_split(&self, root: &Path, split: Split) -> Option<SplitScan> {
        let layout = SplitLayout::new(root, split);
        if !layout.is_present() {
            log::debug!(
                "Skipping {} split: {} or {} missing",
                split,
                layout.images_dir.display(),
                layout.labels_dir.display()
            );
            return None;
        }

        let pairs = self
            .list_images(&layout.images_dir)
            .into_iter()
            .map(|image| SamplePair {
                split,
                annotation: layout.annotation_path(&image),
                image,
            })
            .collect();

        Some(SplitScan { split, pairs })
    }

    /// Supported image files directly inside `dir`, sorted by file name.
    fn list_images(&self, dir: &Path) -> Vec<PathBuf> {
        let mut images = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to list entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && self.is_supported_format(path) {
                images.push(path.to_path_buf());
            }
        }

        images
    }
}

impl Default for ScannerService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_split(root: &Path, split: &str, images: &[&str]) {
        let images_dir = root.join(split).join("images");
        fs::create_dir_all(&images_dir).unwrap();
        fs::create_dir_all(root.join(split).join("labels")).unwrap();
        for name in images {
            fs::write(images_dir.join(name), b"stub").unwrap();
        }
    }

    #[test]
    fn test_supported_format_detection() {
        let scanner = ScannerService::new();

        assert!(scanner.is_supported_format(Path::new("a.jpg")));
        assert!(scanner.is_supported_format(Path::new("a.JPEG")));
        assert!(scanner.is_supported_format(Path::new("a.Png")));
        assert!(!scanner.is_supported_format(Path::new("a.bmp")));
        assert!(!scanner.is_supported_format(Path::new("a.txt")));
        assert!(!scanner.is_supported_format(Path::new("jpg")));
    }

    #[test]
    fn test_annotation_path_replaces_extension() {
        let layout = SplitLayout::new(Path::new("data"), Split::Val);
        let image = Path::new("data/val/images/frame.01.JPG");

        assert_eq!(
            layout.annotation_path(image),
            Path::new("data/val/labels/frame.01.txt")
        );
    }

    #[test]
    fn test_split_order_and_sorting() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_split(root, "test", &["z.png"]);
        make_split(root, "train", &["b.jpg", "a.png", "c.jpeg"]);

        let scans = ScannerService::new().scan_dataset(root);
        let splits: Vec<Split> = scans.iter().map(|s| s.split).collect();
        assert_eq!(splits, vec![Split::Train, Split::Test]);

        let names: Vec<String> = scans[0]
            .pairs
            .iter()
            .map(|p| p.image.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "c.jpeg"]);
        assert_eq!(scans[0].pairs[1].annotation, root.join("train/labels/b.txt"));
    }

    #[test]
    fn test_split_without_labels_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("val").join("images")).unwrap();
        fs::write(root.join("val/images/a.jpg"), b"stub").unwrap();

        let scanner = ScannerService::new();
        assert!(scanner.scan_split(root, Split::Val).is_none());
        assert!(scanner.scan_dataset(root).is_empty());
    }

    #[test]
    fn test_listing_is_not_recursive_and_filters_types() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_split(root, "train", &["keep.jpg", "notes.txt", "raw.bmp"]);
        let nested = root.join("train/images/nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.jpg"), b"stub").unwrap();

        let scan = ScannerService::new().scan_split(root, Split::Train).unwrap();
        assert_eq!(scan.pairs.len(), 1);
        assert!(scan.pairs[0].image.ends_with("keep.jpg"));
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let scans = ScannerService::new().scan_dataset(&temp_dir.path().join("nope"));
        assert!(scans.is_empty());
    }
}
