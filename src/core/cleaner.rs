use crate::core::{filter, normalize, repair, schema::Schema, tokenizer};
use crate::domain::model::{CleanReport, CleanStats, Dataset};

/// Run the whole cleaning pipeline over one in-memory CSV text.
///
/// Never fails: malformed rows are dropped and counted, unparseable values
/// fall back to a literal or zero. Empty input yields an empty dataset.
pub fn clean_csv(text: &str) -> CleanReport {
    let mut stats = CleanStats::default();

    let table = tokenizer::tokenize(text);
    stats.original_rows = table.rows.len();

    let schema = Schema::resolve(&table.headers);
    let mut warnings = schema_warnings(&table.headers, &schema);

    let repaired = repair::repair(&schema, table.rows, &mut stats);
    if repaired.discarded_overflow > 0 {
        warnings.push(format!(
            "{} rows had extra fields that were discarded because no description column exists",
            repaired.discarded_overflow
        ));
    }

    let records = normalize::normalize(&schema, repaired.rows, &mut stats);
    let records = filter::finalize(&schema, records, &mut stats);
    stats.cleaned_rows = records.len();

    tracing::info!(
        "Cleaned {} of {} rows (removed {}, repaired {}, invalid dates {})",
        stats.cleaned_rows,
        stats.original_rows,
        stats.removed_blank,
        stats.repaired_rows,
        stats.invalid_dates
    );
    for warning in &warnings {
        tracing::warn!("⚠️ {}", warning);
    }

    CleanReport {
        dataset: Dataset::new(table.headers, records),
        stats,
        warnings,
    }
}

fn schema_warnings(headers: &[String], schema: &Schema) -> Vec<String> {
    let mut warnings = Vec::new();
    if headers.is_empty() {
        return warnings;
    }
    if schema.date_column.is_none() {
        warnings.push("No date column found in header; every row will be dropped".to_string());
    }
    if schema.description_column.is_none() {
        warnings.push(
            "No description column found in header; every row will be dropped".to_string(),
        );
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_scenario() {
        let report = clean_csv(
            "Date,Description,Amount\n2024-01-01,Coffee,4.5\n,,\n2024-01-02,,10\n",
        );

        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.dataset.field(0, "Date"), Some("2024-01-01"));
        assert_eq!(report.dataset.field(0, "Description"), Some("Coffee"));
        assert_eq!(report.dataset.field(0, "Amount"), Some("$4.50"));

        let stats = &report.stats;
        assert_eq!(stats.original_rows, 3);
        assert_eq!(stats.cleaned_rows, 1);
        assert_eq!(stats.removed_blank, 2);
        assert_eq!(stats.repaired_rows, 0);
        assert_eq!(stats.invalid_dates, 0);
        assert!((stats.total_amount - 4.5).abs() < 1e-9);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let report = clean_csv("");
        assert!(report.dataset.is_empty());
        assert!(report.dataset.headers.is_empty());
        assert_eq!(report.stats, CleanStats::default());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_columns_warn() {
        let report = clean_csv("Name,Total\nA,1\n");
        assert!(report.dataset.is_empty());
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.stats.removed_blank, 1);
    }
}
