//! Ingestion pipeline services: storage layout, rendition generation,
//! capture-metadata extraction and per-file orchestration.

pub mod exif;
pub mod ingest;
pub mod renditions;
pub mod storage;
