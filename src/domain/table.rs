// Tabular records read from a spreadsheet
use chrono::NaiveDate;
use serde::Serialize;

/// Header row plus string cells. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from raw grid values, first row as header.
    ///
    /// Columns with a blank header are dropped, rows with only blank cells are
    /// dropped and short rows are padded with empty cells.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid.into_iter();
        let Some(header) = rows.next() else {
            return Self::default();
        };

        let keep: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.trim().is_empty())
            .map(|(idx, _)| idx)
            .collect();

        let columns = keep.iter().map(|&idx| header[idx].trim().to_string()).collect();

        let rows = rows
            .map(|row| {
                keep.iter()
                    .map(|&idx| row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of a column in row order, or `None` when the column is missing
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Numeric cells of a column; cells that don't parse are skipped
    pub fn numeric_column(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .unwrap_or_default()
            .into_iter()
            .filter_map(parse_number)
            .collect()
    }

    /// Numeric cells of `value_column` on rows where `filter_column == expected`
    pub fn numeric_where(&self, value_column: &str, filter_column: &str, expected: &str) -> Vec<f64> {
        let (Some(v_idx), Some(f_idx)) = (self.column_index(value_column), self.column_index(filter_column))
        else {
            return Vec::new();
        };

        self.rows
            .iter()
            .filter(|row| row[f_idx] == expected)
            .filter_map(|row| parse_number(&row[v_idx]))
            .collect()
    }

    pub fn count_where(&self, name: &str, expected: &str) -> usize {
        self.column(name)
            .map(|cells| cells.into_iter().filter(|c| *c == expected).count())
            .unwrap_or(0)
    }

    /// Distinct non-empty values with their counts, in first-seen order
    pub fn value_counts(&self, name: &str) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for cell in self.column(name).unwrap_or_default() {
            if cell.is_empty() {
                continue;
            }
            match counts.iter_mut().find(|(value, _)| value == cell) {
                Some((_, n)) => *n += 1,
                None => counts.push((cell.to_string(), 1)),
            }
        }
        counts
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Row indices with a parseable date in `name`, newest first
    pub fn rows_by_date_desc(&self, name: &str) -> Vec<(usize, NaiveDate)> {
        let mut dated: Vec<(usize, NaiveDate)> = self
            .column(name)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(idx, cell)| parse_date(cell).map(|d| (idx, d)))
            .collect();
        // Stable sort keeps sheet order for equal dates
        dated.sort_by(|a, b| b.1.cmp(&a.1));
        dated
    }
}

/// Lenient number parsing: tolerates `$`, `%` and thousands separators
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(cell, "%m/%d/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_grid_cleans_rows_and_columns() {
        let table = SheetTable::from_grid(grid(&[
            &["Name", "", "Value"],
            &["John", "x", "5000"],
            &["", "", ""],
            &["Jane"],
        ]));

        assert_eq!(table.columns, vec!["Name", "Value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["Jane".to_string(), String::new()]);
    }

    #[test]
    fn test_from_empty_grid() {
        let table = SheetTable::from_grid(Vec::new());
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_numeric_coercion() {
        let table = SheetTable::from_grid(grid(&[
            &["Value"],
            &["$1,200"],
            &["n/a"],
            &["300.5"],
            &[""],
        ]));

        assert_eq!(table.numeric_column("Value"), vec![1200.0, 300.5]);
        assert!(table.numeric_column("Missing").is_empty());
    }

    #[test]
    fn test_value_counts_and_filters() {
        let table = SheetTable::from_grid(grid(&[
            &["Status", "Amount"],
            &["Paid", "100"],
            &["Pending", "50"],
            &["Paid", "25"],
        ]));

        assert_eq!(
            table.value_counts("Status"),
            vec![("Paid".to_string(), 2), ("Pending".to_string(), 1)]
        );
        assert_eq!(table.count_where("Status", "Paid"), 2);
        assert_eq!(table.numeric_where("Amount", "Status", "Paid"), vec![100.0, 25.0]);
    }

    #[test]
    fn test_rows_by_date_desc() {
        let table = SheetTable::from_grid(grid(&[
            &["Date"],
            &["2024-01-15"],
            &["garbage"],
            &["03/01/2024"],
        ]));

        let order: Vec<usize> = table.rows_by_date_desc("Date").into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![2, 0]);
    }
}
