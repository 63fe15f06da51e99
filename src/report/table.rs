use std::fmt;

/// One value in a report table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, |v| Cell::Text(v.to_string()))
    }

    pub fn float(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Float)
    }

    pub fn int(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Int)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Text(text) => f.write_str(text),
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

/// Floats render the way the JVM prints a double.
///
/// Plain notation with at least one fractional digit inside `[1e-3, 1e7)`
/// (`21.0`, `0.125`), scientific outside it (`2.6E7`, `1.0E-4`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        return format!("{}Infinity", sign);
    }

    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        return if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        };
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

/// A slice of a stage's output, rendered as a bordered text grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    /// Rows available before the display limit was applied
    total_rows: usize,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            total_rows: 0,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
        self.total_rows = self.total_rows.max(self.rows.len());
    }

    /// Declare how many rows existed in total, for the truncation footer
    pub fn with_total_rows(mut self, total: usize) -> Self {
        self.total_rows = total.max(self.rows.len());
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn render(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.chars().count().max(3))
            .collect();
        for row in &rendered {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.chars().count());
            }
        }

        let border: String = widths
            .iter()
            .fold(String::from("+"), |mut line, width| {
                line.push_str(&"-".repeat(*width));
                line.push('+');
                line
            });

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&render_line(&self.columns, &widths));
        out.push_str(&border);
        out.push('\n');
        for row in &rendered {
            out.push_str(&render_line(row, &widths));
        }
        out.push_str(&border);
        out.push('\n');
        if self.total_rows > self.rows.len() {
            let noun = if self.rows.len() == 1 { "row" } else { "rows" };
            out.push_str(&format!("only showing top {} {}\n", self.rows.len(), noun));
        }
        out
    }
}

fn render_line(values: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (value, width) in values.iter().zip(widths) {
        line.push_str(value);
        line.push_str(&" ".repeat(width - value.chars().count()));
        line.push('|');
    }
    line.push('\n');
    line
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
