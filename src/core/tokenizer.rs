use crate::domain::model::RawTable;

/// Split raw CSV text into a header and data rows.
///
/// Blank lines (whitespace only) are skipped and never become rows. Quotes only
/// group commas inside a single line; a doubled quote inside a quoted section
/// yields one literal `"`. Ragged rows are kept as-is for the repair stage.
pub fn tokenize(text: &str) -> RawTable {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_line);

    let headers = lines.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = lines.collect();

    tracing::debug!(
        "Tokenized {} header columns and {} data rows",
        headers.len(),
        rows.len()
    );

    RawTable { headers, rows }
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_header_and_rows() {
        let table = tokenize("Date,Description,Amount\n2024-01-01,Coffee,4.5\n");
        assert_eq!(table.headers, strings(&["Date", "Description", "Amount"]));
        assert_eq!(table.rows, vec![strings(&["2024-01-01", "Coffee", "4.5"])]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let table = tokenize("\n  \nA,B\n\n1,2\n\t\n3,4");
        assert_eq!(table.headers, strings(&["A", "B"]));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_line_of_commas_is_a_row() {
        let table = tokenize("A,B,C\n,,");
        assert_eq!(table.rows, vec![strings(&["", "", ""])]);
    }

    #[test]
    fn test_quoted_commas_and_escaped_quotes() {
        let table = tokenize("A,B\n\"Smith, John\",\"say \"\"hi\"\"\"");
        assert_eq!(table.rows[0], strings(&["Smith, John", "say \"hi\""]));
    }

    #[test]
    fn test_unterminated_quote_swallows_rest_of_line_only() {
        let table = tokenize("A,B\n\"open,still open\nx,y");
        assert_eq!(table.rows[0], strings(&["open,still open"]));
        assert_eq!(table.rows[1], strings(&["x", "y"]));
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let table = tokenize("A,B\n1\n1,2,3,4");
        assert_eq!(table.rows[0], strings(&["1"]));
        assert_eq!(table.rows[1], strings(&["1", "2", "3", "4"]));
    }

    #[test]
    fn test_crlf_line_endings() {
        let table = tokenize("A,B\r\n1,2\r\n");
        assert_eq!(table.headers, strings(&["A", "B"]));
        assert_eq!(table.rows[0], strings(&["1", "2"]));
    }

    #[test]
    fn test_empty_input() {
        let table = tokenize("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
