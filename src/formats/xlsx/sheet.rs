use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use log::debug;

use crate::core::{GenericResult, ScanError};

use super::cell::{self, Cell, CellData, CellValue};
use super::package::Package;
use super::styles::{CellFormat, Styles};
use super::worksheet::{self, Annotations};

const DEFAULT_STYLES_PART: &str = "xl/styles.xml";

/// A loaded worksheet: a 1-indexed grid of cells bounded by `max_row` and `max_column`.
#[derive(Debug)]
pub struct Sheet {
    name: String,
    cells: HashMap<(u32, u32), Cell>,
    max_row: u32,
    max_column: u32,
    empty: Cell,
}

impl Sheet {
    /// Opens the workbook and loads its active sheet.
    pub fn open(path: &Path) -> GenericResult<Sheet> {
        match std::fs::metadata(path) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScanError::input_not_found(format!("{path:?} workbook")));
            },
            Err(e) => return Err!("Unable to open {:?}: {}", path, e),
        }

        let mut package = Package::open(path)?;
        let sheet_part = package.active_sheet()?;
        debug!("Reading {:?} sheet ({}) of {:?}...", sheet_part.name, sheet_part.path, path);

        let styles_part = package.relationships("xl/workbook.xml")?.into_iter()
            .find(|relationship| relationship.is_of_kind("styles"))
            .map(|relationship| relationship.target)
            .unwrap_or_else(|| DEFAULT_STYLES_PART.to_owned());

        let styles = match package.read_part(&styles_part)? {
            Some(data) => Styles::parse(&data)?,
            None => Styles::default(),
        };

        let mut annotations = Annotations::default();
        let worksheet_data = package.read_part(&sheet_part.path)?.ok_or_else(|| ScanError::input_not_found(
            format!("{:?} worksheet part", sheet_part.path)))?;
        let relationships = package.relationships(&sheet_part.path)?;
        worksheet::parse_worksheet(&worksheet_data, &relationships, &mut annotations)?;

        for relationship in relationships.iter().filter(|relationship| relationship.is_of_kind("comments")) {
            if let Some(data) = package.read_part(&relationship.target)? {
                worksheet::parse_comments(&data, &mut annotations)?;
            }
        }

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| format!(
            "Unable to open {path:?}: {e}"))?;

        let values = workbook.worksheet_range(&sheet_part.name).map_err(|e| format!(
            "Unable to read {:?} sheet: {}", sheet_part.name, e))?;
        let formulas = workbook.worksheet_formula(&sheet_part.name).map_err(|e| format!(
            "Unable to read formulas of {:?} sheet: {}", sheet_part.name, e))?;

        let mut builder = SheetBuilder::new(&sheet_part.name);

        if let Some((start_row, start_column)) = values.start() {
            for (row, column, data) in values.used_cells() {
                let (row, column) = (start_row + row as u32 + 1, start_column + column as u32 + 1);
                let value = CellValue::from_data(data).map_err(|reason| ScanError::malformed_cell(
                    row, column, data, reason))?;
                builder.cell_mut(row, column).value = value;
            }
        }

        // Formula cells keep the cached result as their value, the formula text goes separately
        if let Some((start_row, start_column)) = formulas.start() {
            for (row, column, formula) in formulas.used_cells() {
                let (row, column) = (start_row + row as u32 + 1, start_column + column as u32 + 1);
                builder.cell_mut(row, column).formula = Some(format!("={formula}"));
            }
        }

        for (&(row, column), &style_id) in &annotations.style_ids {
            let format = match styles.get(style_id) {
                Some(format) => format.clone(),
                None if styles.is_empty() && style_id == 0 => continue,
                None => return Err(ScanError::malformed_cell(
                    row, column, style_id, format!("unknown cell format #{style_id}"))),
            };
            builder.cell_mut(row, column).format = format;
        }

        for (&(row, column), link) in &annotations.links {
            builder.cell_mut(row, column).link = Some(link.clone());
        }

        for (&(row, column), comment) in &annotations.comments {
            builder.cell_mut(row, column).comment = Some(comment.clone());
        }

        let sheet = builder.build();
        debug!("{:?} sheet has {} rows and {} columns.", sheet.name, sheet.max_row, sheet.max_column);

        Ok(sheet)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    pub fn cell(&self, row: u32, column: u32) -> GenericResult<&Cell> {
        if row == 0 || column == 0 || row > self.max_row || column > self.max_column {
            return Err(ScanError::malformed_cell(row, column, None::<CellValue>, format!(
                "the cell is out of the sheet bounds ({}x{})", self.max_row, self.max_column)));
        }
        Ok(self.cells.get(&(row, column)).unwrap_or(&self.empty))
    }

    /// Same as `cell()`, but treats the columns to the right of the sheet as empty ones: fixed
    /// layout columns may be missing in narrow sheets.
    pub fn layout_cell(&self, row: u32, column: u32) -> GenericResult<&Cell> {
        if column > self.max_column && (1..=self.max_row).contains(&row) {
            return Ok(&self.empty);
        }
        self.cell(row, column)
    }

    pub fn value(&self, row: u32, column: u32) -> GenericResult<Option<&CellValue>> {
        Ok(self.cell(row, column)?.value.as_ref())
    }

    pub fn read(&self, row: u32, column: u32) -> GenericResult<CellData> {
        Ok(cell::read(self.cell(row, column)?))
    }

    /// Checks whether the row which follows the specified one is past the end of the sheet or has an
    /// empty first column.
    pub fn is_next_row_empty(&self, row: u32) -> bool {
        if row == 0 {
            return false;
        }

        let next_row = row + 1;
        if next_row > self.max_row {
            return true;
        }

        cell::is_blank(self.cells.get(&(next_row, 1)).and_then(|cell| cell.value.as_ref()))
    }
}

/// Assembles a sheet cell by cell. Sheet bounds are derived from cells with any content.
pub struct SheetBuilder {
    name: String,
    cells: HashMap<(u32, u32), Cell>,
}

impl SheetBuilder {
    pub fn new(name: &str) -> SheetBuilder {
        SheetBuilder {
            name: name.to_owned(),
            cells: HashMap::new(),
        }
    }

    pub fn cell_mut(&mut self, row: u32, column: u32) -> &mut Cell {
        self.cells.entry((row, column)).or_default()
    }

    pub fn value(mut self, row: u32, column: u32, value: impl Into<CellValue>) -> SheetBuilder {
        self.cell_mut(row, column).value = Some(value.into());
        self
    }

    pub fn formula(mut self, row: u32, column: u32, formula: &str, value: impl Into<CellValue>) -> SheetBuilder {
        let cell = self.cell_mut(row, column);
        cell.formula = Some(formula.to_owned());
        cell.value = Some(value.into());
        self
    }

    pub fn comment(mut self, row: u32, column: u32, comment: &str) -> SheetBuilder {
        self.cell_mut(row, column).comment = Some(comment.to_owned());
        self
    }

    pub fn link(mut self, row: u32, column: u32, link: &str) -> SheetBuilder {
        self.cell_mut(row, column).link = Some(link.to_owned());
        self
    }

    pub fn format(mut self, row: u32, column: u32, format: CellFormat) -> SheetBuilder {
        self.cell_mut(row, column).format = format;
        self
    }

    /// Fills a row starting from the first column, skipping `None` values.
    pub fn row<V: Into<CellValue>>(mut self, row: u32, values: Vec<Option<V>>) -> SheetBuilder {
        for (index, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                self.cell_mut(row, index as u32 + 1).value = Some(value.into());
            }
        }
        self
    }

    pub fn build(self) -> Sheet {
        let (mut max_row, mut max_column) = (0, 0);

        for (&(row, column), cell) in &self.cells {
            if cell.has_content() {
                max_row = max_row.max(row);
                max_column = max_column.max(column);
            }
        }

        Sheet {
            name: self.name,
            cells: self.cells,
            max_row, max_column,
            empty: Cell::default(),
        }
    }
}
