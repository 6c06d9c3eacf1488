use std::io::Write;
use std::path::Path;

use dicom_core::Tag;
use s3::Bucket;
use serde::Serialize;
use snafu::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::storage;

mod pixels;
pub mod stats;

pub use stats::{pixel_statistics, round2, PixelStatistics};

/// Default output file for the statistics table.
pub const OUTPUT_FILE: &str = "intensity_statistics.csv";

/// One row of intensity statistics, one per decoded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntensityRecord {
    pub file: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Any failure here aborts the whole extraction; there is no
/// per-file isolation.
// context selectors are consumed from the binary crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// No objects found in {location}
    NoObjects { location: String },

    /// No DICOM files found in {location}
    NoDicomFiles { location: String },

    /// Object storage error
    Storage { source: storage::Error },

    /// Could not walk directory {dir}
    WalkDir {
        dir: String,
        source: walkdir::Error,
    },

    /// Could not read file {path}
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Object {key} is not a DICOM file (missing DICM magic)
    InvalidDicom { key: String },

    /// Could not parse DICOM object {key}
    ReadObject {
        key: String,
        source: dicom_object::ReadError,
    },

    /// Missing attribute {tag}
    MissingAttribute {
        tag: Tag,
        source: dicom_object::AccessError,
    },

    /// Could not convert attribute {tag}
    ConvertField {
        tag: Tag,
        source: dicom_core::value::ConvertValueError,
    },

    /// Pixel data of {key} is empty
    EmptyPixelData { key: String },

    /// Pixel buffer of {key} too short: expected {expected} bytes, got {actual}
    ShortPixelData {
        key: String,
        expected: usize,
        actual: usize,
    },

    /// Unsupported bits allocated: {bits_allocated}
    UnsupportedBitsAllocated { bits_allocated: u16 },

    /// Could not create output file {path}
    CreateFile {
        path: String,
        source: std::io::Error,
    },

    /// Could not write statistics CSV
    WriteCsv { source: csv::Error },

    /// Could not write output
    WriteOutput { source: std::io::Error },
}

/// Recognized image-file suffix.
pub fn is_dicom_key(key: &str) -> bool {
    key.ends_with(".dcm")
}

/// Decode one DICOM buffer and compute its statistics row.
fn record_for(key: &str, data: &[u8]) -> Result<IntensityRecord, Error> {
    let obj = pixels::read_object(key, data)?;
    let samples = pixels::pixel_samples(key, &obj)?;
    let stats = pixel_statistics(&samples).context(EmptyPixelDataSnafu { key: key.to_string() })?;
    Ok(IntensityRecord {
        file: key.to_string(),
        mean: stats.mean,
        median: stats.median,
        std: stats.std,
    })
}

/// Narrow a listing down to the `.dcm` keys to process.
///
/// The shared post-listing step of both pipelines: an empty listing is
/// an explicit error, and in `first_only` mode a missing match is one
/// too (a single-record response cannot be empty).
fn select_keys(location: &str, keys: Vec<String>, first_only: bool) -> Result<Vec<String>, Error> {
    ensure!(
        !keys.is_empty(),
        NoObjectsSnafu {
            location: location.to_string(),
        }
    );
    let mut matches: Vec<String> = keys.into_iter().filter(|k| is_dicom_key(k)).collect();
    if first_only {
        ensure!(
            !matches.is_empty(),
            NoDicomFilesSnafu {
                location: location.to_string(),
            }
        );
        matches.truncate(1);
    }
    Ok(matches)
}

/// Compute statistics for the `.dcm` objects in a bucket.
///
/// With `first_only`, stop after the first matching object; used for
/// the single-record JSON response.
pub async fn collect_bucket_statistics(
    bucket: &Bucket,
    prefix: &str,
    first_only: bool,
) -> Result<Vec<IntensityRecord>, Error> {
    let location = format!("bucket {}", bucket.name());
    let keys = storage::list_objects(bucket, prefix)
        .await
        .context(StorageSnafu)?;
    let selected = select_keys(&location, keys, first_only)?;

    let mut records = Vec::new();
    for key in selected {
        let data = storage::get_object(bucket, &key)
            .await
            .context(StorageSnafu)?;
        let record = record_for(&key, &data)?;
        debug!(
            "{}: mean={} median={} std={}",
            record.file, record.mean, record.median, record.std
        );
        records.push(record);
    }
    info!("Computed statistics for {} DICOM objects", records.len());
    Ok(records)
}

/// Compute statistics for the `.dcm` files under a local directory.
///
/// The local counterpart of the bucket pipeline; files are visited in
/// name order so `first_only` is deterministic.
pub fn collect_dir_statistics(dir: &Path, first_only: bool) -> Result<Vec<IntensityRecord>, Error> {
    let location = format!("directory {}", dir.display());
    let mut keys = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context(WalkDirSnafu {
            dir: dir.display().to_string(),
        })?;
        if !entry.file_type().is_dir() {
            keys.push(entry.path().display().to_string());
        }
    }
    let selected = select_keys(&location, keys, first_only)?;

    let mut records = Vec::new();
    for key in selected {
        let data = std::fs::read(&key).context(ReadFileSnafu { path: key.clone() })?;
        records.push(record_for(&key, &data)?);
    }
    info!("Computed statistics for {} DICOM files", records.len());
    Ok(records)
}

/// Write the statistics table as CSV with a `file,mean,median,std` header.
pub fn write_statistics_csv<W: Write>(writer: W, records: &[IntensityRecord]) -> Result<(), Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record).context(WriteCsvSnafu)?;
    }
    if records.is_empty() {
        // serialize() never ran, emit the header on its own
        csv.write_record(["file", "mean", "median", "std"])
            .context(WriteCsvSnafu)?;
    }
    csv.flush().context(WriteOutputSnafu)?;
    Ok(())
}

/// Write the statistics CSV to `path`.
pub fn write_statistics_file(path: &Path, records: &[IntensityRecord]) -> Result<(), Error> {
    let file = std::fs::File::create(path).context(CreateFileSnafu {
        path: path.display().to_string(),
    })?;
    write_statistics_csv(std::io::BufWriter::new(file), records)
}
