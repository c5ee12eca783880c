use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Tokenized file content before any repair: first non-blank line is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One data row mapped onto the header; fields past the header count land in `overflow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub values: Vec<String>,
    pub overflow: Vec<String>,
}

/// A cleaned row. Values are positional and line up with [`Dataset::headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Ordered records sharing one header. Header names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of the first column named exactly `column`.
    pub fn field(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.records.get(row)?.value(index)
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Shape<'a> {
            headers: &'a [String],
            records: Vec<RecordView<'a>>,
        }

        let records = self
            .records
            .iter()
            .map(|record| RecordView {
                headers: &self.headers,
                record,
            })
            .collect();

        Shape {
            headers: &self.headers,
            records,
        }
        .serialize(serializer)
    }
}

// 以表頭順序輸出成 JSON 物件
struct RecordView<'a> {
    headers: &'a [String],
    record: &'a Record,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (i, header) in self.headers.iter().enumerate() {
            map.serialize_entry(header, self.record.value(i).unwrap_or(""))?;
        }
        map.end()
    }
}

/// Counters collected while cleaning. Created empty, frozen into [`CleanReport`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanStats {
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub total_amount: f64,
    pub removed_blank: usize,
    pub repaired_rows: usize,
    pub invalid_dates: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub dataset: Dataset,
    pub stats: CleanStats,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_serializes_records_in_header_order() {
        let dataset = Dataset::new(
            vec!["Date".to_string(), "Amount".to_string()],
            vec![Record::new(vec![
                "2024-01-01".to_string(),
                "$4.50".to_string(),
            ])],
        );

        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(
            json,
            r#"{"headers":["Date","Amount"],"records":[{"Date":"2024-01-01","Amount":"$4.50"}]}"#
        );
    }

    #[test]
    fn test_field_lookup_uses_first_matching_header() {
        let dataset = Dataset::new(
            vec!["Note".to_string(), "Note".to_string()],
            vec![Record::new(vec!["a".to_string(), "b".to_string()])],
        );
        assert_eq!(dataset.field(0, "Note"), Some("a"));
        assert_eq!(dataset.field(0, "Missing"), None);
        assert_eq!(dataset.field(3, "Note"), None);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = CleanStats {
            removed_blank: 2,
            ..Default::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["removedBlank"], 2);
        assert_eq!(value["totalAmount"], 0.0);
    }
}
