//! Capture-metadata extraction.
//!
//! Reads a bounded prefix of the full-size file and parses whatever EXIF it
//! carries. The capture timestamp feeds `shot_at`; the rest is flattened
//! into an opaque blob stored for later display, never validated.

use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use exif::{In, Tag, Value};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// How much of the file is scanned for metadata. EXIF lives in the leading
/// segments; 64 KiB covers every camera we have seen.
pub const EXIF_SCAN_BYTES: usize = 64 * 1024;

/// What the ingestion pipeline needs from a file's embedded metadata.
#[derive(Debug, Clone, Default)]
pub struct CaptureMetadata {
    /// Capture timestamp (DateTimeOriginal), if present and parsable.
    pub shot_at: Option<DateTime<Utc>>,
    /// EXIF orientation value (tag 274), 1..=8.
    pub orientation: Option<u32>,
    /// All parsed fields as display strings, for the opaque `exif_data` blob.
    pub raw: Option<serde_json::Value>,
}

/// Extract capture metadata from the leading bytes of `path`.
///
/// Never fails: unreadable files or missing/corrupt EXIF yield an empty
/// `CaptureMetadata` and the caller falls back to ingestion time.
pub async fn read_capture_metadata(path: &Path) -> CaptureMetadata {
    let buf = match read_prefix(path).await {
        Ok(buf) => buf,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Could not read file for EXIF scan");
            return CaptureMetadata::default();
        }
    };

    tokio::task::spawn_blocking(move || parse_exif(&buf))
        .await
        .unwrap_or_default()
}

async fn read_prefix(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(EXIF_SCAN_BYTES);
    (&mut file)
        .take(EXIF_SCAN_BYTES as u64)
        .read_to_end(&mut buf)
        .await?;
    Ok(buf)
}

fn parse_exif(buf: &[u8]) -> CaptureMetadata {
    let mut cursor = Cursor::new(buf);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(err) => {
            debug!(error = %err, "No parsable EXIF data");
            return CaptureMetadata::default();
        }
    };

    let shot_at = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Ascii(ref vecs) => vecs.first(),
            _ => None,
        })
        .and_then(|ascii| exif::DateTime::from_ascii(ascii).ok())
        .and_then(datetime_to_utc);

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .filter(|v| (1..=8).contains(v));

    let mut fields = serde_json::Map::new();
    for field in exif.fields() {
        let key = field.tag.to_string();
        fields
            .entry(key)
            .or_insert_with(|| field.display_value().with_unit(&exif).to_string().into());
    }
    let raw = (!fields.is_empty()).then_some(serde_json::Value::Object(fields));

    CaptureMetadata {
        shot_at,
        orientation,
        raw,
    }
}

fn datetime_to_utc(dt: exif::DateTime) -> Option<DateTime<Utc>> {
    // Cameras rarely write an offset; treat the wall-clock value as UTC.
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())
        .and_then(|date| {
            date.and_hms_nano_opt(
                dt.hour.into(),
                dt.minute.into(),
                dt.second.into(),
                dt.nanosecond.unwrap_or(0),
            )
        })
        .map(|naive| naive.and_utc())
}
