use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use derive_more::{Display, From};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use umya_spreadsheet::{reader, writer, Spreadsheet, Worksheet};

use crate::sheet::{AddressError, CellRef};

/// Display type of a written value. Formats only change how the sheet shows
/// the value, never the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    #[display("string")]
    String,
    #[display("float")]
    Float,
    #[display("int")]
    Int,
    #[display("scientific")]
    Scientific,
    #[display("currency")]
    Currency,
}

impl ValueType {
    pub fn format_code(&self) -> Option<&'static str> {
        match self {
            Self::String => None,
            Self::Float => Some("#,##0.00"),
            Self::Int => Some("#,##0"),
            Self::Scientific => Some("0.00E+00"),
            Self::Currency => Some("$#,##0.00"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, From, Display)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("workbook is not instantiated at `{0}`")]
    NotInstantiated(PathBuf),
    #[error("the workbook has no sheet {0}")]
    MissingSheet(usize),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(
        "maximum row range exceeded: all {row_range} rows of the window starting \
         at row {start_row} are occupied"
    )]
    WindowFull { start_row: u32, row_range: u32 },
    #[error("row {row} is outside the window [{start_row}, {end_row}]")]
    RowOutOfRange { row: i64, start_row: u32, end_row: u32 },
    #[error("nothing to remove: the window starting at row {start_row} is empty")]
    NothingToRemove { start_row: u32 },
    #[error("failed to load workbook `{path}`: {source}")]
    Load { path: PathBuf, source: anyhow::Error },
    #[error("failed to save workbook `{path}`: {source}")]
    Save { path: PathBuf, source: anyhow::Error },
    #[error("io error on `{path}`: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Bound to one template/sheet pair. All mutations target the working
/// instance, a session-scoped copy of the template. Every write is a full
/// load-mutate-save cycle; the file on disk is the only durability boundary.
///
/// Concurrent use of the same instance path is unsupported: two writers
/// interleave as last-writer-wins on whole-file saves.
pub struct SheetEngine {
    template: PathBuf,
    sheet: usize,
    instance: PathBuf,
}

impl SheetEngine {
    pub fn new(
        template: impl Into<PathBuf>,
        sheet: usize,
        instance: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template: template.into(),
            sheet,
            instance: instance.into(),
        }
    }

    /// Copies the template over the working instance, replacing any previous
    /// instance, and returns the instance path.
    pub fn instantiate(&self) -> Result<&Path, SheetError> {
        if let Some(parent) = self.instance.parent() {
            fs::create_dir_all(parent).map_err(|source| SheetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::copy(&self.template, &self.instance).map_err(|source| SheetError::Io {
            path: self.template.clone(),
            source,
        })?;

        info!("instantiated working copy at {}", self.instance.display());
        Ok(&self.instance)
    }

    #[must_use]
    pub fn is_instantiated(&self) -> bool {
        self.instance.is_file()
    }

    pub fn instance(&self) -> &Path {
        &self.instance
    }

    /// Removes the working instance. A missing instance is not an error.
    pub fn clean_up(&self) -> Result<(), SheetError> {
        match fs::remove_file(&self.instance) {
            Ok(()) => {
                info!("removed working copy at {}", self.instance.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no working copy to remove at {}", self.instance.display());
                Ok(())
            }
            Err(source) => Err(SheetError::Io {
                path: self.instance.clone(),
                source,
            }),
        }
    }

    fn load(&self) -> Result<Spreadsheet, SheetError> {
        if !self.is_instantiated() {
            return Err(SheetError::NotInstantiated(self.instance.clone()));
        }

        reader::xlsx::read(&self.instance).map_err(|e| SheetError::Load {
            path: self.instance.clone(),
            source: anyhow::Error::new(e),
        })
    }

    fn save(&self, book: &Spreadsheet) -> Result<(), SheetError> {
        writer::xlsx::write(book, &self.instance).map_err(|e| SheetError::Save {
            path: self.instance.clone(),
            source: anyhow::Error::new(e),
        })
    }

    fn worksheet<'a>(&self, book: &'a Spreadsheet) -> Result<&'a Worksheet, SheetError> {
        book.get_sheet(&self.sheet)
            .ok_or(SheetError::MissingSheet(self.sheet))
    }

    fn worksheet_mut<'a>(
        &self,
        book: &'a mut Spreadsheet,
    ) -> Result<&'a mut Worksheet, SheetError> {
        book.get_sheet_mut(&self.sheet)
            .ok_or(SheetError::MissingSheet(self.sheet))
    }

    pub fn write_cell(
        &self,
        cell: &CellRef,
        value: &CellValue,
        value_type: ValueType,
    ) -> Result<(), SheetError> {
        debug!("writing {} = {} ({})", cell, value, value_type);

        let mut book = self.load()?;
        {
            let sheet = self.worksheet_mut(&mut book)?;
            let coordinate = cell.to_string();

            if let Some(code) = value_type.format_code() {
                sheet
                    .get_style_mut(coordinate.as_str())
                    .get_number_format_mut()
                    .set_format_code(code);
            }

            match value {
                CellValue::Text(text) => {
                    sheet.get_cell_mut(coordinate.as_str()).set_value(text.clone());
                }
                CellValue::Number(number) => {
                    sheet
                        .get_cell_mut(coordinate.as_str())
                        .set_value_number(*number);
                }
            }
        }

        self.save(&book)
    }

    /// Reads a cell as the sheet displays it; an empty string means the cell
    /// holds no value.
    pub fn read_cell(&self, cell: &CellRef) -> Result<String, SheetError> {
        let book = self.load()?;
        let sheet = self.worksheet(&book)?;
        Ok(sheet.get_value(cell.to_string().as_str()))
    }

    pub fn read_range(
        &self,
        from: &CellRef,
        to: &CellRef,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let book = self.load()?;
        let sheet = self.worksheet(&book)?;

        let mut rows = Vec::new();
        for row in from.row()..=to.row() {
            let mut cells = Vec::new();
            for column in from.column_index()..=to.column_index() {
                cells.push(sheet.get_value((column, row)));
            }
            rows.push(cells);
        }

        Ok(rows)
    }

    /// Scans the window `[start_row, start_row + row_range)` of `column` and
    /// returns the last occupied row, or `None` when the whole window is
    /// empty. A window with every row occupied has no room left to append,
    /// which is reported as [`SheetError::WindowFull`].
    pub fn find_last_occupied_row(
        &self,
        column: &str,
        start_row: u32,
        row_range: u32,
    ) -> Result<Option<u32>, SheetError> {
        let anchor = CellRef::new(column, start_row)?;
        let book = self.load()?;
        let sheet = self.worksheet(&book)?;

        let occupied: Vec<u32> = (start_row..start_row + row_range)
            .filter(|row| !sheet.get_value((anchor.column_index(), *row)).is_empty())
            .collect();

        if occupied.len() as u32 >= row_range {
            debug!("occupied rows: {:?}", occupied);
            return Err(SheetError::WindowFull {
                start_row,
                row_range,
            });
        }

        Ok(occupied.last().copied())
    }

    /// Clears every cell of one row inside the iteration window. A
    /// non-negative `row_index` addresses `start_row + row_index`; a negative
    /// one counts back from the last occupied row of `column`, so `-1` is the
    /// last occupied row. Cells are emptied in place, rows below keep their
    /// positions.
    pub fn remove_row(
        &self,
        row_index: i64,
        column: &str,
        start_row: u32,
        row_range: u32,
    ) -> Result<u32, SheetError> {
        // saturate on extreme indices so the bounds check below reports them
        let target: i64 = if row_index >= 0 {
            i64::from(start_row).saturating_add(row_index)
        } else {
            let last = self
                .find_last_occupied_row(column, start_row, row_range + 1)?
                .ok_or(SheetError::NothingToRemove { start_row })?;
            i64::from(last).saturating_add(row_index).saturating_add(1)
        };

        let end_row = start_row + row_range;
        if target < i64::from(start_row) || target > i64::from(end_row) {
            return Err(SheetError::RowOutOfRange {
                row: target,
                start_row,
                end_row,
            });
        }
        let target = target as u32;

        let mut book = self.load()?;
        {
            let sheet = self.worksheet_mut(&mut book)?;
            for col in 1..=sheet.get_highest_column() {
                sheet.get_cell_mut((col, target)).set_value("");
            }
        }
        self.save(&book)?;

        info!("cleared row {}", target);
        Ok(target)
    }
}
