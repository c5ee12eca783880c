use crate::core::schema::Schema;
use crate::domain::model::{CleanStats, Record};

/// Last pass before output: drop blank records, re-trim values and drop
/// anything missing a date or a description. Every drop counts as removed.
pub fn finalize(schema: &Schema, records: Vec<Record>, stats: &mut CleanStats) -> Vec<Record> {
    let before = records.len();

    let kept: Vec<Record> = records
        .into_iter()
        .filter(|record| record.values().iter().any(|v| !v.trim().is_empty()))
        .map(|record| {
            Record::new(
                record
                    .into_values()
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .collect(),
            )
        })
        .filter(|record| schema.is_complete(record.values()))
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::debug!("Final filter dropped {} incomplete rows", dropped);
    }
    stats.removed_blank += dropped;

    kept
}
