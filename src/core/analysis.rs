use crate::core::annotation::AnnotationReader;
use crate::core::duplicate::DuplicateTables;
use crate::core::hash::HashService;
use crate::core::record::{AnnotationRecord, ImageRecord, SampleRecord};
use crate::core::report::Report;
use crate::core::scanner::{SamplePair, ScannerService, SplitScan};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Worker threads for per-image work; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Draw spinners/bars on stderr.
    pub progress: bool,
}

/// Runs one read-only pass over a dataset: walk the splits, fingerprint
/// images, read labels, then group everything into a report.
pub struct DatasetAnalyzer {
    scanner: ScannerService,
    hash_service: HashService,
    reader: AnnotationReader,
    pool: Option<rayon::ThreadPool>,
    progress: bool,
}

impl DatasetAnalyzer {
    pub fn new(options: AnalysisOptions) -> Result<Self, AnalysisError> {
        let pool = match options.jobs {
            Some(jobs) => Some(rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?),
            None => None,
        };

        Ok(Self {
            scanner: ScannerService::new(),
            hash_service: HashService::new(),
            reader: AnnotationReader::new(),
            pool,
            progress: options.progress,
        })
    }

    pub fn analyze(&self, root: &Path) -> Report {
        let tables = self.collect_tables(root);
        Report::compile(&tables)
    }

    /// Process every split and fold the records into grouping tables.
    /// Records arrive in discovery order: split order, then file name.
    pub fn collect_tables(&self, root: &Path) -> DuplicateTables {
        let records = self.collect_records(root);
        DuplicateTables::from_records(&records)
    }

    pub fn collect_records(&self, root: &Path) -> Vec<SampleRecord> {
        let scans = self.discover(root);

        let total: usize = scans.iter().map(|scan| scan.pairs.len()).sum();
        let bar = self.progress_bar(total as u64);

        let mut records = Vec::with_capacity(total);
        for scan in &scans {
            log::info!(
                "Analyzing {} directory ({} images)...",
                scan.split,
                scan.pairs.len()
            );
            bar.set_message(scan.split.as_str());
            records.extend(self.process_split(scan, &bar));
        }
        bar.finish_and_clear();

        records
    }

    fn discover(&self, root: &Path) -> Vec<SplitScan> {
        let spinner = self.spinner();
        spinner.set_message("Scanning splits…");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let scans = self.scanner.scan_dataset(root);

        spinner.finish_and_clear();
        scans
    }

    fn process_split(&self, scan: &SplitScan, bar: &ProgressBar) -> Vec<SampleRecord> {
        // Indexed collect keeps discovery order regardless of scheduling.
        let work = || {
            scan.pairs
                .par_iter()
                .map(|pair| {
                    let record = self.process_pair(pair);
                    bar.inc(1);
                    record
                })
                .collect::<Vec<_>>()
        };

        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    /// Size, fingerprint and label are read independently; each failure is
    /// logged and leaves only its own field empty.
    pub fn process_pair(&self, pair: &SamplePair) -> SampleRecord {
        let size = match fs::metadata(&pair.image) {
            Ok(metadata) => Some(metadata.len()),
            Err(e) => {
                log::warn!("Failed to read size of {}: {}", pair.image.display(), e);
                None
            }
        };

        let fingerprint = match self.hash_service.compute_fingerprint(&pair.image) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                log::warn!("Error processing {}: {}", pair.image.display(), e);
                None
            }
        };

        let content = match self.reader.read(&pair.annotation) {
            Ok(content) => Some(content),
            Err(e) => {
                log::warn!(
                    "Error reading annotation {}: {}",
                    pair.annotation.display(),
                    e
                );
                None
            }
        };

        SampleRecord {
            image: ImageRecord {
                path: pair.image.clone(),
                split: pair.split,
                size,
                fingerprint,
            },
            annotation: AnnotationRecord {
                path: pair.annotation.clone(),
                content,
            },
        }
    }

    fn spinner(&self) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::with_template("{msg:>5} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::Split;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn create_test_image(path: &Path, width: u32, height: u32, seed: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let v = ((x * seed + y) % 256) as u8;
            Rgb([v, v / 2, 255 - v])
        });
        img.save(path).unwrap();
    }

    fn analyzer(jobs: Option<usize>) -> DatasetAnalyzer {
        DatasetAnalyzer::new(AnalysisOptions {
            jobs,
            progress: false,
        })
        .unwrap()
    }

    #[test]
    fn test_process_pair_with_missing_label() {
        let temp_dir = TempDir::new().unwrap();
        let image = temp_dir.path().join("a.png");
        create_test_image(&image, 16, 16, 3);

        let pair = SamplePair {
            split: Split::Train,
            image: image.clone(),
            annotation: temp_dir.path().join("a.txt"),
        };
        let record = analyzer(Some(1)).process_pair(&pair);

        assert_eq!(record.image.size, Some(fs::metadata(&image).unwrap().len()));
        assert!(record.image.fingerprint.is_some());
        assert!(record.annotation.content.is_none());
    }

    #[test]
    fn test_parallel_collection_keeps_discovery_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for split in ["train", "val"] {
            let images = root.join(split).join("images");
            fs::create_dir_all(&images).unwrap();
            fs::create_dir_all(root.join(split).join("labels")).unwrap();
            for i in 0..12 {
                create_test_image(&images.join(format!("img_{i:02}.png")), 12, 12, i + 1);
            }
        }

        let sequential = analyzer(Some(1)).collect_records(root);
        let parallel = analyzer(Some(4)).collect_records(root);

        assert_eq!(sequential.len(), 24);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential[0].image.split, Split::Train);
        assert!(sequential[0].image.path.ends_with("img_00.png"));
        assert_eq!(sequential[12].image.split, Split::Val);
    }

    #[test]
    fn test_zero_jobs_uses_default_pool_size() {
        // rayon treats 0 as "pick automatically".
        assert!(DatasetAnalyzer::new(AnalysisOptions {
            jobs: Some(0),
            progress: false,
        })
        .is_ok());
    }
}
