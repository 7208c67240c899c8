use crate::core::hash::Fingerprint;
use crate::core::scanner::Split;
use std::path::PathBuf;

/// One discovered image. `size` and `fingerprint` are `None` when the
/// corresponding read failed; the two are independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub split: Split,
    pub size: Option<u64>,
    pub fingerprint: Option<Fingerprint>,
}

/// The label paired with an image by name. `content` is the trimmed text,
/// or `None` when the file could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub path: PathBuf,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub image: ImageRecord,
    pub annotation: AnnotationRecord,
}
