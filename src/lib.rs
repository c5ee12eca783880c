pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{cleaner::clean_csv, etl::EtlEngine, pipeline::CsvCleanPipeline};
pub use domain::model::{CleanReport, CleanStats, Dataset, Record};
pub use utils::error::{EtlError, Result};
