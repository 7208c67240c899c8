// Grouping tables for duplicate detection:
// - byte size -> image paths (cheap, many false positives)
// - fingerprint -> image paths (identical after 8x8 grayscale reduction)
// - trimmed label text -> annotation paths

use crate::core::hash::Fingerprint;
use crate::core::record::SampleRecord;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateType {
    Exact,      // Same fingerprint
    Size,       // Same byte size
    Annotation, // Same label text
}

impl DuplicateType {
    pub const ALL: [DuplicateType; 3] = [
        DuplicateType::Exact,
        DuplicateType::Size,
        DuplicateType::Annotation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DuplicateType::Exact => "Exact Image Duplicates",
            DuplicateType::Size => "Size-based Duplicates",
            DuplicateType::Annotation => "Annotation Duplicates",
        }
    }
}

/// Equality classes keyed by `K`. Keys keep the order they were first seen
/// in and members keep their insertion order.
#[derive(Debug, Clone)]
pub struct GroupTable<K> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<PathBuf>)>,
}

impl<K: Eq + Hash + Clone> GroupTable<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: K, path: PathBuf) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(path),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![path]));
            }
        }
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of paths across all keys.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|(_, paths)| paths.len()).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.groups
            .iter()
            .flat_map(|(_, paths)| paths.iter().map(PathBuf::as_path))
    }

    /// Classes with more than one member, in first-seen order.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = (&K, &[PathBuf])> {
        self.groups
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(key, paths)| (key, paths.as_slice()))
    }
}

impl<K: Eq + Hash + Clone> Default for GroupTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three grouping tables for one analysis pass. Built once from the
/// processed records and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DuplicateTables {
    sizes: GroupTable<u64>,
    fingerprints: GroupTable<Fingerprint>,
    annotations: GroupTable<String>,
}

impl DuplicateTables {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SampleRecord>,
    {
        let mut tables = Self::default();
        for record in records {
            tables.add(record);
        }
        tables
    }

    fn add(&mut self, record: &SampleRecord) {
        let image = &record.image;
        if let Some(size) = image.size {
            self.sizes.insert(size, image.path.clone());
        }
        if let Some(fingerprint) = &image.fingerprint {
            self.fingerprints
                .insert(fingerprint.clone(), image.path.clone());
        }

        let annotation = &record.annotation;
        match annotation.content.as_deref() {
            Some("") => {
                log::debug!("Empty annotation {}", annotation.path.display());
            }
            Some(content) => {
                self.annotations
                    .insert(content.to_string(), annotation.path.clone());
            }
            None => {}
        }
    }

    pub fn sizes(&self) -> &GroupTable<u64> {
        &self.sizes
    }

    pub fn fingerprints(&self) -> &GroupTable<Fingerprint> {
        &self.fingerprints
    }

    pub fn annotations(&self) -> &GroupTable<String> {
        &self.annotations
    }

    /// Number of duplicate groups of the given kind.
    pub fn group_count(&self, kind: DuplicateType) -> usize {
        match kind {
            DuplicateType::Exact => self.fingerprints.duplicate_groups().count(),
            DuplicateType::Size => self.sizes.duplicate_groups().count(),
            DuplicateType::Annotation => self.annotations.duplicate_groups().count(),
        }
    }
}
