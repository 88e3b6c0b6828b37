use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StaffingError;
use crate::grid::{Grid, StyleSnapshot};

const STYLES_FILE: &str = "styles.json";

/// Formatting of one cell as stored in `styles.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StyledCell {
    row: usize,
    col: usize,
    style: StyleSnapshot,
}

/// A directory of CSV sheets standing in for the school's spreadsheet.
///
/// Every `<name>.csv` file is a sheet called `<name>`; cell formatting lives in
/// an optional `styles.json` keyed by sheet name.
#[derive(Debug, Clone)]
pub struct Workbook {
    dir: Option<PathBuf>,
    sheets: BTreeMap<String, Grid>,
}

/// Reads one headerless CSV sheet; rows may have different lengths
fn read_sheet(path: &Path) -> Result<Grid, StaffingError> {
    let csv_error = |source| StaffingError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(Grid::from_rows(rows))
}

fn write_sheet(path: &Path, grid: &Grid) -> Result<(), StaffingError> {
    let csv_error = |source| StaffingError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let width = grid.last_column();
    for row in &grid.rows()[..grid.last_row()] {
        // pad to a rectangle so spreadsheet tools line the columns up
        let values: Vec<&str> = (0..width)
            .map(|i| row.get(i).map_or("", |c| c.value.as_str()))
            .collect();
        writer.write_record(&values).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| StaffingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Workbook {
    /// Loads every CSV sheet in `dir` together with its formatting
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StaffingError> {
        let dir = dir.as_ref().to_path_buf();
        let io_error = |source| StaffingError::Io {
            path: dir.clone(),
            source,
        };

        let mut sheets = BTreeMap::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!(sheet = name, "loading sheet");
            sheets.insert(name.to_string(), read_sheet(&path)?);
        }

        info!(dir = %dir.display(), sheets = sheets.len(), "opened workbook");
        let mut workbook = Self {
            dir: Some(dir),
            sheets,
        };
        workbook.load_styles()?;
        Ok(workbook)
    }

    /// An empty workbook that will be saved to `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
            sheets: BTreeMap::new(),
        }
    }

    /// A workbook that lives only in memory; saving is a no-op
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            sheets: BTreeMap::new(),
        }
    }

    fn read_styles(&self, dir: &Path) -> Result<BTreeMap<String, Vec<StyledCell>>, StaffingError> {
        let path = dir.join(STYLES_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&path).map_err(|source| StaffingError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StaffingError::Json { path, source })
    }

    fn load_styles(&mut self) -> Result<(), StaffingError> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        for (sheet, cells) in self.read_styles(dir)? {
            let Some(grid) = self.sheets.get_mut(&sheet) else {
                debug!(sheet = %sheet, "styles for a sheet that does not exist");
                continue;
            };
            for cell in cells {
                if cell.row == 0 || cell.col == 0 {
                    continue;
                }
                grid.set_style(cell.row, cell.col, Some(cell.style));
            }
        }
        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.get(name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Grid> {
        self.sheets.get_mut(name)
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, grid: Grid) {
        self.sheets.insert(name.into(), grid);
    }

    /// Sheet names in sorted order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    /// Mutable access to one sheet alongside shared access to others.
    /// Returns `None` for the mutable sheet if it is missing or also named in `others`.
    pub fn split_sheet_mut<'a>(&'a mut self, name: &str, others: &[&str]) -> (Option<&'a mut Grid>, Vec<Option<&'a Grid>>) {
        if others.contains(&name) {
            let shared = others.iter().map(|o| self.sheets.get(*o)).collect();
            return (None, shared);
        }
        let mut target = None;
        let mut shared: Vec<Option<&Grid>> = vec![None; others.len()];
        for (key, grid) in self.sheets.iter_mut() {
            if key == name {
                target = Some(grid);
            } else if let Some(i) = others.iter().position(|o| *o == key.as_str()) {
                shared[i] = Some(&*grid);
            }
        }
        (target, shared)
    }

    /// Writes one sheet back to `<name>.csv` and refreshes its entry in `styles.json`
    pub fn save_sheet(&self, name: &str) -> Result<(), StaffingError> {
        let (Some(dir), Some(grid)) = (self.dir.as_deref(), self.sheets.get(name)) else {
            return Ok(());
        };
        fs::create_dir_all(dir).map_err(|source| StaffingError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        write_sheet(&dir.join(format!("{}.csv", name)), grid)?;

        let mut styles = self.read_styles(dir)?;
        let cells: Vec<StyledCell> = grid
            .styled_cells()
            .map(|(row, col, style)| StyledCell {
                row,
                col,
                style: style.clone(),
            })
            .collect();
        if cells.is_empty() {
            styles.remove(name);
        } else {
            styles.insert(name.to_string(), cells);
        }

        let path = dir.join(STYLES_FILE);
        if styles.is_empty() && !path.exists() {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&styles).map_err(|source| StaffingError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StaffingError::Io { path, source })?;

        debug!(sheet = name, "saved sheet");
        Ok(())
    }
}
