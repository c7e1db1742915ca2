/// Text rendering and CSV import/export
///
/// `Display` draws the visible grid with a leading logical row number.
/// CSV export writes the header and every row in logical order, quoting
/// fields that contain a delimiter, quote or line break. CSV import reads
/// every value as a string; the first record is the header.

use crate::error::{Result, TableError};
use crate::table::Table;
use log::debug;
use std::fmt;

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col_count() == 0 {
            return write!(f, "(no columns, {} rows)", self.row_count());
        }

        let mut header = vec!["#".to_string()];
        header.extend(self.column_names().into_iter().map(String::from));

        let body: Vec<Vec<String>> = self
            .iter_rows()
            .enumerate()
            .map(|(index, values)| {
                std::iter::once(index.to_string())
                    .chain(values.into_iter().map(escape_control))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let rule = |fill: char| -> String {
            let mut line = String::from("+");
            for &width in &widths {
                line.extend(std::iter::repeat(fill).take(width + 2));
                line.push('+');
            }
            line
        };

        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            write!(f, "|")?;
            for (cell, &width) in cells.iter().zip(&widths) {
                write!(f, " {:<width$} |", cell, width = width)?;
            }
            writeln!(f)
        };

        writeln!(f, "{}", rule('-'))?;
        write_row(f, &header)?;
        writeln!(f, "{}", rule('='))?;
        for row in &body {
            write_row(f, row)?;
        }
        write!(f, "{}", rule('-'))
    }
}

/// Keep multi-line values on one grid line
fn escape_control(value: &str) -> String {
    value.replace('\r', "\\r").replace('\n', "\\n")
}

fn quote_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_record<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let fields: Vec<String> = values.into_iter().map(quote_csv_field).collect();
    // A lone empty field would read back as a blank line
    if fields.len() == 1 && fields[0].is_empty() {
        return "\"\"".to_string();
    }
    fields.join(",")
}

impl Table {
    /// Export the visible table as CSV (header row first).
    ///
    /// ```
    /// use tabledit::Table;
    ///
    /// let mut table = Table::new();
    /// table.add_cols(&["id", "name"]);
    /// table.add_row();
    /// table.set_cells(&[(0, "id", "1"), (0, "name", "Smith, Jo")]).unwrap();
    ///
    /// assert_eq!(table.to_csv(), "id,name\n1,\"Smith, Jo\"\n");
    /// ```
    pub fn to_csv(&self) -> String {
        let mut result = String::new();

        result.push_str(&csv_record(self.column_names()));
        result.push('\n');

        for values in self.iter_rows() {
            result.push_str(&csv_record(values));
            result.push('\n');
        }
        result
    }

    /// Build a table from CSV text. All values are kept as strings.
    ///
    /// Short records are padded with empty cells; a record longer than the
    /// header, an empty input, or a repeated header name is `InvalidState`.
    /// Blank lines are skipped; a quoted empty field (`""`) is a record with
    /// one empty cell. The result has no undo history.
    pub fn from_csv(csv: &str) -> Result<Table> {
        let mut records = parse_csv_records(csv).into_iter();

        let header = records
            .next()
            .ok_or_else(|| TableError::invalid("CSV is empty"))?;

        let mut table = Table::new();
        let names: Vec<&str> = header.iter().map(String::as_str).collect();
        if table.add_cols(&names) != names.len() {
            return Err(TableError::invalid("CSV header repeats a column name"));
        }
        let columns: Vec<_> = table.col_order.iter().collect();

        for (line, record) in records.enumerate() {
            if record.len() > columns.len() {
                return Err(TableError::invalid(format!(
                    "CSV record {} has {} fields, header has {}",
                    line + 1,
                    record.len(),
                    columns.len()
                )));
            }
            let cells: Vec<(usize, &str)> = columns
                .iter()
                .copied()
                .zip(record.iter().map(String::as_str))
                .collect();
            table.push_row_unrecorded(cells);
        }

        table.clear_history();
        debug!(
            "imported CSV with {} rows and {} columns",
            table.row_count(),
            table.col_count()
        );
        Ok(table)
    }
}

/// Split CSV text into records, honouring quoted fields with embedded
/// delimiters, doubled quotes and line breaks. A quote only opens a quoted
/// section at the start of a field. Lines with no characters and no quotes
/// produce no record.
fn parse_csv_records(csv: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut quoted = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                quoted = true;
                at_field_start = false;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\n' => {
                if !field.is_empty() || !record.is_empty() || quoted {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                at_field_start = true;
                quoted = false;
            }
            // \r\n line endings
            '\r' if chars.peek() == Some(&'\n') => {}
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if !field.is_empty() || !record.is_empty() || quoted {
        record.push(field);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_fields() {
        let records = parse_csv_records("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n\"multi\nline\",2\n");
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["x, y".to_string(), "say \"hi\"".to_string()],
                vec!["multi\nline".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_missing_trailing_newline() {
        let records = parse_csv_records("a,b\r\n1,2");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_quote_inside_field_is_literal() {
        let records = parse_csv_records("5\"2,x\n");
        assert_eq!(records[0], vec!["5\"2".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_csv_round_trip() {
        let mut table = Table::new();
        table.add_cols(&["name", "note"]);
        table.add_rows(3);
        table
            .set_cells(&[
                (0, "name", "a,b"),
                (0, "note", "quote \"q\""),
                (1, "note", "two\nlines"),
                (2, "name", "plain"),
            ])
            .unwrap();

        let restored = Table::from_csv(&table.to_csv()).unwrap();
        assert_eq!(restored.column_names(), vec!["name", "note"]);
        assert_eq!(restored.iter_rows().collect::<Vec<_>>(), table.iter_rows().collect::<Vec<_>>());
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_parse_blank_line_versus_quoted_empty_field() {
        let records = parse_csv_records("x\n\n\"\"\n\r\n\"\"");
        assert_eq!(
            records,
            vec![vec!["x".to_string()], vec!["".to_string()], vec!["".to_string()]]
        );
    }

    #[test]
    fn test_single_column_round_trip_keeps_empty_cells() {
        let mut table = Table::new();
        table.add_col("x");
        table.add_rows(3);
        table.set_cells(&[(0, "x", "a"), (2, "x", "c")]).unwrap();

        let csv = table.to_csv();
        assert_eq!(csv, "x\na\n\"\"\nc\n");

        let restored = Table::from_csv(&csv).unwrap();
        assert_eq!(restored.row_count(), 3);
        assert_eq!(restored.get(1, "x").unwrap(), "");
        assert_eq!(restored.get(2, "x").unwrap(), "c");
    }

    #[test]
    fn test_from_csv_pads_short_records() {
        let table = Table::from_csv("a,b,c\n1\n\n4,5,6\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "a").unwrap(), "1");
        assert_eq!(table.get(0, "c").unwrap(), "");
        assert_eq!(table.get(1, "c").unwrap(), "6");
    }

    #[test]
    fn test_from_csv_errors() {
        assert!(matches!(Table::from_csv(""), Err(TableError::InvalidState(_))));
        assert!(Table::from_csv("a,a\n1,2\n").is_err());
        assert!(Table::from_csv("a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn test_display_grid() {
        let mut table = Table::new();
        table.add_cols(&["x", "long"]);
        table.add_rows(2);
        table.set(1, "x", "abc").unwrap();

        let expected = "\
+---+-----+------+
| # | x   | long |
+===+=====+======+
| 0 |     |      |
| 1 | abc |      |
+---+-----+------+";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_display_without_columns() {
        let mut table = Table::new();
        table.add_rows(2);
        assert_eq!(table.to_string(), "(no columns, 2 rows)");
    }
}
