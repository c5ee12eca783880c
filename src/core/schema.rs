//! Column roles resolved once from the header.
//!
//! Names are matched by case-insensitive substring. When several columns
//! match a key role, the first one in header order wins.

/// Normalization rule applied to every value of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Currency,
    Boolean,
    Text,
}

impl ColumnRole {
    /// Precedence: date, then amount/price, then paid, then plain text.
    pub fn from_header(name: &str) -> Self {
        let name = name.to_lowercase();
        if is_date(&name) {
            ColumnRole::Date
        } else if is_amount(&name) {
            ColumnRole::Currency
        } else if name.contains("paid") {
            ColumnRole::Boolean
        } else {
            ColumnRole::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub roles: Vec<ColumnRole>,
    /// First column whose name contains "date".
    pub date_column: Option<usize>,
    /// First column whose name contains "description" or "desc".
    pub description_column: Option<usize>,
    /// First column whose name contains "amount" or "price"; feeds the running total.
    pub amount_column: Option<usize>,
}

impl Schema {
    pub fn resolve(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

        let schema = Self {
            roles: headers.iter().map(|h| ColumnRole::from_header(h)).collect(),
            date_column: lowered.iter().position(|h| is_date(h)),
            // "desc" already covers "description"
            description_column: lowered.iter().position(|h| h.contains("desc")),
            amount_column: lowered.iter().position(|h| is_amount(h)),
        };

        tracing::debug!(
            "Resolved schema: date={:?}, description={:?}, amount={:?}",
            schema.date_column,
            schema.description_column,
            schema.amount_column
        );

        schema
    }

    pub fn width(&self) -> usize {
        self.roles.len()
    }

    /// True when the row has a non-blank value in both the date and the description column.
    pub fn is_complete(&self, values: &[String]) -> bool {
        self.has_date(values) && self.has_description(values)
    }

    pub fn has_date(&self, values: &[String]) -> bool {
        non_blank(values, self.date_column)
    }

    pub fn has_description(&self, values: &[String]) -> bool {
        non_blank(values, self.description_column)
    }
}

fn is_date(lowered: &str) -> bool {
    lowered.contains("date")
}

fn is_amount(lowered: &str) -> bool {
    lowered.contains("amount") || lowered.contains("price")
}

fn non_blank(values: &[String], column: Option<usize>) -> bool {
    column
        .and_then(|i| values.get(i))
        .is_some_and(|v| !v.trim().is_empty())
}
