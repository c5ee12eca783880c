use crate::core::schema::Schema;
use crate::domain::model::{CleanStats, RawRow};

#[derive(Debug, Default)]
pub struct RepairOutcome {
    /// Rows that survived, each exactly as wide as the header.
    pub rows: Vec<Vec<String>>,
    /// Rows whose extra fields were dropped because no description column exists.
    pub discarded_overflow: usize,
}

/// Map a tokenized row onto the header width, padding short rows with empty values.
pub fn map_row(fields: Vec<String>, width: usize) -> RawRow {
    let mut values = fields;
    let overflow = if values.len() > width {
        values.split_off(width)
    } else {
        values.resize(width, String::new());
        Vec::new()
    };
    RawRow { values, overflow }
}

/// Merge overflow fields into the description column and drop rows with
/// neither a date nor a description.
pub fn repair(schema: &Schema, rows: Vec<Vec<String>>, stats: &mut CleanStats) -> RepairOutcome {
    let mut outcome = RepairOutcome::default();

    for fields in rows {
        let RawRow {
            mut values,
            overflow,
        } = map_row(fields, schema.width());

        if !overflow.is_empty() {
            match schema.description_column {
                Some(index) => merge_overflow(&mut values[index], &overflow),
                None => {
                    tracing::trace!("Discarding {} overflow fields", overflow.len());
                    outcome.discarded_overflow += 1;
                }
            }
            stats.repaired_rows += 1;
        }

        if !schema.has_date(&values) && !schema.has_description(&values) {
            tracing::trace!("Dropping row without date and description: {:?}", values);
            stats.removed_blank += 1;
            continue;
        }

        outcome.rows.push(values);
    }

    tracing::debug!(
        "Repair kept {} rows ({} repaired, {} removed so far)",
        outcome.rows.len(),
        stats.repaired_rows,
        stats.removed_blank
    );

    outcome
}

fn merge_overflow(description: &mut String, overflow: &[String]) {
    let extra = overflow
        .iter()
        .map(|field| field.trim())
        .collect::<Vec<_>>()
        .join(", ");

    let base = description.trim();
    let merged = if base.is_empty() {
        extra
    } else {
        format!("{}, {}", base, extra)
    };

    *description = merged.trim().to_string();
}
