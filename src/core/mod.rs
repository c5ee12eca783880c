pub mod cleaner;
pub mod etl;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod repair;
pub mod schema;
pub mod tokenizer;

pub use crate::domain::model::{CleanReport, CleanStats, Dataset, Record};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
