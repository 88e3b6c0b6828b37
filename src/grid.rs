use serde::{Deserialize, Serialize};

/// Formatting captured from a template cell.
///
/// The engine never looks inside; it copies the snapshot from the template to
/// the schedule cell that receives the lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
    pub vertical: bool,
    pub horizontal: bool,
}

/// A single sheet cell: its text and, optionally, its formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: String,
    pub style: Option<StyleSnapshot>,
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A rectangular sheet addressed by 1-based (row, column), like a spreadsheet.
///
/// Rows may be ragged; cells outside the stored area read as blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a grid from plain values, row by row
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| Cell {
                        value: value.into(),
                        style: None,
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows.get(row - 1)?.get(col - 1)
    }

    /// Trimmed cell text, empty when the cell does not exist
    pub fn value(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(|c| c.value.trim()).unwrap_or("")
    }

    /// Cell text exactly as stored, empty when the cell does not exist
    pub fn raw_value(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map_or("", |c| c.value.as_str())
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        assert!(row > 0 && col > 0, "grid addresses are 1-based");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize_with(col, Cell::default);
        }
        &mut cells[col - 1]
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.cell_mut(row, col).value = value.into();
    }

    pub fn set_style(&mut self, row: usize, col: usize, style: Option<StyleSnapshot>) {
        self.cell_mut(row, col).style = style;
    }

    /// Empties a cell's text and formatting without growing the grid
    pub fn clear(&mut self, row: usize, col: usize) {
        if row == 0 || col == 0 {
            return;
        }
        if let Some(cell) = self.rows.get_mut(row - 1).and_then(|r| r.get_mut(col - 1)) {
            *cell = Cell::default();
        }
    }

    /// Last row holding a non-blank value, 0 for an empty grid
    pub fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_blank()))
            .map_or(0, |i| i + 1)
    }

    /// Last column holding a non-blank value in any row, 0 for an empty grid
    pub fn last_column(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.iter().rposition(|c| !c.is_blank()))
            .max()
            .map_or(0, |i| i + 1)
    }

    /// Raw rows, used when the sheet is written back to disk
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Every styled cell as (row, column, style)
    pub fn styled_cells(&self) -> impl Iterator<Item = (usize, usize, &StyleSnapshot)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.style.as_ref().map(|s| (r + 1, c + 1, s)))
        })
    }
}
