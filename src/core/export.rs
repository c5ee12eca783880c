use crate::domain::model::{CleanReport, Dataset};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
    Summary,
}

impl OutputFormat {
    pub fn file_name(&self, stem: &str) -> String {
        match self {
            OutputFormat::Csv => format!("{}_cleaned.csv", stem),
            OutputFormat::Tsv => format!("{}_cleaned.tsv", stem),
            OutputFormat::Json => format!("{}_cleaned.json", stem),
            OutputFormat::Summary => format!("{}_summary.txt", stem),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EtlError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(EtlError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub data: Vec<u8>,
}

pub fn render_delimited(dataset: &Dataset, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(&dataset.headers)?;
    for record in &dataset.records {
        writer.write_record(record.values())?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn render_json(report: &CleanReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// Plain-text counterpart of the report header: title, total, date and counters.
pub fn render_summary(report: &CleanReport, source_name: &str, generated_on: NaiveDate) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    // String 寫入不會失敗
    let _ = writeln!(out, "CSV Report Summary");
    let _ = writeln!(out, "==================");
    let _ = writeln!(out, "Source: {}", source_name);
    let _ = writeln!(out, "Generated on: {}", generated_on.format("%Y-%m-%d"));
    let _ = writeln!(out, "Total Amount: ${:.2}", stats.total_amount);
    let _ = writeln!(out);
    let _ = writeln!(out, "Original rows:       {}", stats.original_rows);
    let _ = writeln!(out, "Cleaned rows:        {}", stats.cleaned_rows);
    let _ = writeln!(out, "Removed blank rows:  {}", stats.removed_blank);
    let _ = writeln!(out, "Repaired rows:       {}", stats.repaired_rows);
    let _ = writeln!(out, "Rows w/ bad dates:   {}", stats.invalid_dates);

    if !report.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings:");
        for warning in &report.warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }

    out
}

pub fn render_artifacts(
    report: &CleanReport,
    source_name: &str,
    stem: &str,
    formats: &[OutputFormat],
    generated_on: NaiveDate,
) -> Result<Vec<Artifact>> {
    formats
        .iter()
        .map(|format| -> Result<Artifact> {
            let data = match format {
                OutputFormat::Csv => render_delimited(&report.dataset, b',')?,
                OutputFormat::Tsv => render_delimited(&report.dataset, b'\t')?,
                OutputFormat::Json => render_json(report)?,
                OutputFormat::Summary => {
                    render_summary(report, source_name, generated_on).into_bytes()
                }
            };
            Ok(Artifact {
                file_name: format.file_name(stem),
                data,
            })
        })
        .collect()
}

pub fn bundle_zip(artifacts: &[Artifact]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for artifact in artifacts {
        zip.start_file::<_, ()>(artifact.file_name.as_str(), FileOptions::default())?;
        zip.write_all(&artifact.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cleaner::clean_csv;

    fn sample_report() -> CleanReport {
        clean_csv(
            "Date,Description,Amount,Paid\n\
             2024-01-01,\"Coffee, large\",4.5,yes\n\
             2024-01-03,Books,1234,no\n",
        )
    }

    fn generated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" summary ".parse::<OutputFormat>().unwrap(), OutputFormat::Summary);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.file_name("ledger"), "ledger_cleaned.json");
    }

    #[test]
    fn test_render_csv_quotes_embedded_commas() {
        let report = sample_report();
        let csv = String::from_utf8(render_delimited(&report.dataset, b',').unwrap()).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Description,Amount,Paid");
        assert_eq!(lines[1], "2024-01-01,\"Coffee, large\",$4.50,Yes");
        assert_eq!(lines[2], "2024-01-03,Books,\"$1,234.00\",No");
    }

    #[test]
    fn test_render_tsv() {
        let report = sample_report();
        let tsv = String::from_utf8(render_delimited(&report.dataset, b'\t').unwrap()).unwrap();
        assert!(tsv.starts_with("Date\tDescription\tAmount\tPaid\n"));
        assert!(tsv.contains("2024-01-03\tBooks\t$1,234.00\tNo"));
    }

    #[test]
    fn test_render_json_shape() {
        let report = sample_report();
        let value: serde_json::Value = serde_json::from_slice(&render_json(&report).unwrap()).unwrap();

        assert_eq!(value["dataset"]["records"][0]["Description"], "Coffee, large");
        assert_eq!(value["stats"]["cleanedRows"], 2);
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_render_summary() {
        let report = sample_report();
        let summary = render_summary(&report, "ledger.csv", generated_on());

        assert!(summary.starts_with("CSV Report Summary\n"));
        assert!(summary.contains("Generated on: 2024-02-01"));
        assert!(summary.contains("Total Amount: $1238.50"));
        assert!(summary.contains("Cleaned rows:        2"));
        assert!(!summary.contains("Warnings:"));
    }

    #[test]
    fn test_bundle_zip_contains_every_artifact() {
        let report = sample_report();
        let artifacts = render_artifacts(
            &report,
            "ledger.csv",
            "ledger",
            &[OutputFormat::Csv, OutputFormat::Summary],
            generated_on(),
        )
        .unwrap();

        let zip_bytes = bundle_zip(&artifacts).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["ledger_cleaned.csv", "ledger_summary.txt"]);
    }
}
