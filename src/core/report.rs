use crate::core::duplicate::{DuplicateTables, DuplicateType};
use crate::core::scanner::Split;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_REPORT_FILE: &str = "dataset_analysis_report.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub dataset_statistics: DatasetStatistics,
    pub duplicate_analysis: DuplicateAnalysis,
    pub split_analysis: SplitAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub total_images: usize,
    pub total_annotations: usize,
    pub unique_image_sizes: usize,
    pub unique_annotations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateAnalysis {
    pub exact_image_duplicates: DuplicateSection<HashGroup>,
    pub size_based_duplicates: DuplicateSection<SizeGroup>,
    pub annotation_duplicates: DuplicateSection<AnnotationGroup>,
}

/// One table's duplicate groups. `count` is the number of groups and
/// `total_duplicate_files` the number of files across them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSection<G> {
    pub count: usize,
    pub total_duplicate_files: usize,
    pub examples: Vec<G>,
}

pub trait GroupExample {
    fn files(&self) -> &[String];
    fn count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashGroup {
    pub hash: String,
    pub files: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGroup {
    pub size_bytes: u64,
    pub files: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationGroup {
    pub content: String,
    pub files: Vec<String>,
    pub count: usize,
}

macro_rules! impl_group_example {
    ($($ty:ty),*) => {
        $(impl GroupExample for $ty {
            fn files(&self) -> &[String] {
                &self.files
            }

            fn count(&self) -> usize {
                self.count
            }
        })*
    };
}

impl_group_example!(HashGroup, SizeGroup, AnnotationGroup);

impl<G: GroupExample> DuplicateSection<G> {
    pub fn new(examples: Vec<G>) -> Self {
        Self {
            count: examples.len(),
            total_duplicate_files: examples.iter().map(GroupExample::count).sum(),
            examples,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTally {
    pub images: usize,
    pub annotations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAnalysis {
    pub train: SplitTally,
    pub val: SplitTally,
    pub test: SplitTally,
}

impl SplitAnalysis {
    pub fn get(&self, split: Split) -> &SplitTally {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    fn get_mut(&mut self, split: Split) -> &mut SplitTally {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

/// Count paths whose text contains `split`'s name anywhere, so a path under
/// `train/` that also mentions "test" counts toward both.
fn count_mentions<'a>(paths: impl Iterator<Item = &'a Path>, split: Split) -> usize {
    paths
        .filter(|p| p.to_string_lossy().contains(split.as_str()))
        .count()
}

impl Report {
    pub fn compile(tables: &DuplicateTables) -> Self {
        Self::compile_at(tables, Local::now())
    }

    pub fn compile_at(tables: &DuplicateTables, generated_at: DateTime<Local>) -> Self {
        let dataset_statistics = DatasetStatistics {
            total_images: tables.fingerprints().member_count(),
            total_annotations: tables.annotations().member_count(),
            unique_image_sizes: tables.sizes().key_count(),
            unique_annotations: tables.annotations().key_count(),
        };

        let exact = tables
            .fingerprints()
            .duplicate_groups()
            .map(|(hash, files)| HashGroup {
                hash: hash.to_string(),
                files: display_paths(files),
                count: files.len(),
            })
            .collect();

        let sized = tables
            .sizes()
            .duplicate_groups()
            .map(|(&size_bytes, files)| SizeGroup {
                size_bytes,
                files: display_paths(files),
                count: files.len(),
            })
            .collect();

        let annotated = tables
            .annotations()
            .duplicate_groups()
            .map(|(content, files)| AnnotationGroup {
                content: content.clone(),
                files: display_paths(files),
                count: files.len(),
            })
            .collect();

        let mut split_analysis = SplitAnalysis::default();
        for split in Split::ALL {
            let tally = split_analysis.get_mut(split);
            tally.images = count_mentions(tables.fingerprints().paths(), split);
            tally.annotations = count_mentions(tables.annotations().paths(), split);
        }

        Self {
            timestamp: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            dataset_statistics,
            duplicate_analysis: DuplicateAnalysis {
                exact_image_duplicates: DuplicateSection::new(exact),
                size_based_duplicates: DuplicateSection::new(sized),
                annotation_duplicates: DuplicateSection::new(annotated),
            },
            split_analysis,
        }
    }

    /// Number of duplicate groups of the given kind.
    pub fn group_count(&self, kind: DuplicateType) -> usize {
        let analysis = &self.duplicate_analysis;
        match kind {
            DuplicateType::Exact => analysis.exact_image_duplicates.count,
            DuplicateType::Size => analysis.size_based_duplicates.count,
            DuplicateType::Annotation => analysis.annotation_duplicates.count,
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `path`, replacing any previous run's file.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let stats = &self.dataset_statistics;

        writeln!(out, "\n=== Dataset Analysis Report ===")?;
        writeln!(out, "Generated at: {}", self.timestamp)?;

        writeln!(out, "\nDataset Statistics:")?;
        writeln!(out, "Total Images: {}", stats.total_images)?;
        writeln!(out, "Total Annotations: {}", stats.total_annotations)?;
        writeln!(out, "Unique Image Sizes: {}", stats.unique_image_sizes)?;
        writeln!(out, "Unique Annotations: {}", stats.unique_annotations)?;

        writeln!(out, "\nDuplicate Analysis:")?;
        for kind in DuplicateType::ALL {
            writeln!(out, "{}: {}", kind.label(), self.group_count(kind))?;
        }

        writeln!(out, "\nSplit Analysis:")?;
        for split in Split::ALL {
            let tally = self.split_analysis.get(split);
            writeln!(out, "\n{} Split:", split.as_str().to_uppercase())?;
            writeln!(out, "  Images: {}", tally.images)?;
            writeln!(out, "  Annotations: {}", tally.annotations)?;
        }

        Ok(())
    }
}
