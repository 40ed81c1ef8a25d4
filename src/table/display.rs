//! Text rendering of a table
//!
//! ```text
//! +-------------------------+
//! | Golf Clubs              |
//! +-------------------------+
//! | Variable | Club   | Yds |
//! +-------------------------+
//! | Dgj5     | Driver | 230 |
//! +-------------------------+
//! ```

use crate::error::Result;
use crate::row::{Row, Scalar};

use super::Table;

/// Render the name, the column header and one line per row, each column
/// padded to its widest cell. `Null` fields render blank.
pub fn render(table: &dyn Table) -> Result<String> {
    // Collect once: file-backed iteration order is not guaranteed to repeat
    let rows: Vec<Row> = table.rows()?.collect::<Result<_>>()?;
    let columns = table.columns();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        widen(&mut widths, 0, row.key.chars().count());
        for (i, field) in row.fields.iter().enumerate() {
            widen(&mut widths, i + 1, cell(field).chars().count());
        }
    }

    let header = line(columns.iter().map(String::as_str), &widths);
    // header ends with "\n"; inner width excludes "| ", "|" and the newline
    let inner = header.chars().count() - 4;
    let title = format!("| {:<inner$}|\n", table.name(), inner = inner);
    let rule = format!("+{}+\n", "-".repeat(header.chars().count() - 3));

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&title);
    out.push_str(&rule);
    out.push_str(&header);
    out.push_str(&rule);
    for row in &rows {
        let cells: Vec<String> = row.fields.iter().map(cell).collect();
        let values = std::iter::once(row.key.as_str()).chain(cells.iter().map(String::as_str));
        out.push_str(&line(values, &widths));
    }
    out.push_str(&rule);
    Ok(out)
}

fn cell(field: &Scalar) -> String {
    match field {
        Scalar::Null => String::new(),
        other => other.to_string(),
    }
}

fn widen(widths: &mut Vec<usize>, index: usize, width: usize) {
    if index >= widths.len() {
        widths.resize(index + 1, 0);
    }
    widths[index] = widths[index].max(width);
}

fn line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .zip(widths)
        .map(|(value, &width)| format!("{:<width$}", value, width = width))
        .collect();
    format!("| {} |\n", padded.join(" | "))
}
