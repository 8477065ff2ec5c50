pub mod ingest;
pub mod normalizer;
pub mod report;
