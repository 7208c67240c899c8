pub mod analysis;
pub mod annotation;
pub mod duplicate;
pub mod hash;
pub mod record;
pub mod report;
pub mod scanner;
