use crate::core::cleaner::clean_csv;
use crate::core::export::{self, OutputFormat};
use crate::core::{CleanReport, ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::{Local, NaiveDate};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Reads one CSV file, cleans it and writes the selected artifacts.
pub struct CsvCleanPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    generated_on: NaiveDate,
}

impl<S: Storage, C: ConfigProvider> CsvCleanPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            generated_on: Local::now().date_naive(),
        }
    }

    /// 固定報表日期 (測試用)
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }

    fn source_name(&self) -> String {
        Path::new(self.config.input_path())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input.csv")
            .to_string()
    }

    fn source_stem(&self) -> String {
        Path::new(self.config.input_path())
            .file_stem()
            .and_then(|n| n.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("output")
            .to_string()
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        self.config
            .output_formats()
            .iter()
            .map(|f| f.parse())
            .collect()
    }

    fn output_file(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvCleanPipeline<S, C> {
    async fn extract(&self) -> Result<String> {
        let path = self.config.input_path();
        tracing::debug!("Reading CSV input from: {}", path);

        let bytes = self.storage.read_file(path).await?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "Input is not valid UTF-8 ({}), invalid bytes were replaced",
                    e.utf8_error()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let text = match text.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_string(),
            None => text,
        };

        tracing::debug!("Read {} bytes of text", text.len());
        Ok(text)
    }

    async fn transform(&self, text: String) -> Result<CleanReport> {
        let report = clean_csv(&text);
        tracing::debug!("Clean stats: {:?}", report.stats);
        Ok(report)
    }

    async fn load(&self, report: CleanReport) -> Result<String> {
        if report.dataset.is_empty() {
            return Err(EtlError::EmptyDataset {
                source_name: self.source_name(),
            });
        }

        let formats = self.output_formats()?;
        let stem = self.source_stem();
        let artifacts = export::render_artifacts(
            &report,
            &self.source_name(),
            &stem,
            &formats,
            self.generated_on,
        )?;

        if self.config.compression_enabled() {
            let archive_name = self
                .config
                .archive_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_report.zip", stem));

            tracing::debug!("Creating ZIP file with {} files", artifacts.len());
            let zip_data = export::bundle_zip(&artifacts)?;

            let archive_path = self.output_file(&archive_name);
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&archive_path, &zip_data).await?;
            return Ok(archive_path);
        }

        for artifact in &artifacts {
            let path = self.output_file(&artifact.file_name);
            tracing::debug!("Writing {} ({} bytes)", path, artifact.data.len());
            self.storage.write_file(&path, &artifact.data).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
