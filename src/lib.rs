//! Duplicate and integrity analysis for image datasets laid out as
//! `root/{train,val,test}/{images,labels}/`.
//!
//! Images are fingerprinted after reduction to an 8x8 grayscale grid, labels
//! are compared as trimmed text, and both are grouped together with a
//! byte-size table into a [`Report`].

pub mod core;

pub use crate::core::analysis::{AnalysisError, AnalysisOptions, DatasetAnalyzer};
pub use crate::core::duplicate::{DuplicateTables, DuplicateType};
pub use crate::core::hash::{Fingerprint, HashService};
pub use crate::core::report::{DEFAULT_REPORT_FILE, Report, ReportError};
pub use crate::core::scanner::Split;
