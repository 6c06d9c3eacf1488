//! Consolidated inventory output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use snafu::prelude::*;

use super::StoreRecord;

/// Output file format for the consolidated inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Txt,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Txt => "txt",
        }
    }
}

#[derive(Debug, Snafu)]
pub enum Error {
    /// Could not create output file {path}
    CreateFile {
        path: String,
        source: std::io::Error,
    },

    /// Could not write CSV output
    WriteCsv { source: csv::Error },

    /// Could not write output
    WriteOutput { source: std::io::Error },
}

/// Dated output file name, e.g. `omics_data_stores_2024-05-17.csv`.
pub fn output_file_name(format: ReportFormat, date: NaiveDate) -> String {
    format!(
        "omics_data_stores_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Write the consolidated table as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, records: &[StoreRecord]) -> Result<(), Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["type", "date", "name", "region", "store_id"])
        .context(WriteCsvSnafu)?;
    for record in records {
        csv.write_record([
            record.kind.as_str(),
            &record.date.format("%Y-%m-%d").to_string(),
            &record.name,
            &record.region,
            &record.store_id,
        ])
        .context(WriteCsvSnafu)?;
    }
    csv.flush().context(WriteOutputSnafu)?;
    Ok(())
}

/// Write the consolidated table as tab-separated lines, one per store.
pub fn write_txt<W: Write>(mut writer: W, records: &[StoreRecord]) -> Result<(), Error> {
    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            record.kind.as_str(),
            record.date.format("%Y-%m-%d"),
            record.name,
            record.region,
            record.store_id,
        )
        .context(WriteOutputSnafu)?;
    }
    Ok(())
}

/// Write the dated inventory file into `dir` and return its path.
pub fn write_report(
    dir: &Path,
    format: ReportFormat,
    date: NaiveDate,
    records: &[StoreRecord],
) -> Result<PathBuf, Error> {
    let path = dir.join(output_file_name(format, date));
    let file = File::create(&path).context(CreateFileSnafu {
        path: path.display().to_string(),
    })?;
    let writer = BufWriter::new(file);
    match format {
        ReportFormat::Csv => write_csv(writer, records)?,
        ReportFormat::Txt => write_txt(writer, records)?,
    }
    Ok(path)
}
