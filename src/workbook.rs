//! Upload carrier and workbook loading.
//!
//! Both accepted container formats (legacy binary `.xls` and OOXML `.xlsx`)
//! are copied cell by cell into the same in-memory [`Workbook`], so every
//! later stage reads a single representation. Coordinates are absolute and
//! zero-based: `A1` is `(0, 0)` no matter where the used range starts.

use crate::error::{IpoReadinessError, Result};
use crate::layout::LayoutKey;
use crate::utils::cell_position;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Default ceiling on a single upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// A file handed over by the request layer: a name and its full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads the stream to its end exactly once.
    pub fn from_reader(filename: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(filename, bytes))
    }

    /// Lowercase extension without the dot, empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Layout variant implied by the file extension.
    pub fn layout_key(&self) -> LayoutKey {
        if self.extension() == "xls" {
            LayoutKey::Legacy
        } else {
            LayoutKey::Standard
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Date(String),
    Error(String),
}

impl CellValue {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Empty => None,
            Data::Int(i) => Some(CellValue::Number(*i as f64)),
            Data::Float(f) => Some(CellValue::Number(*f)),
            Data::String(s) if s.is_empty() => None,
            Data::String(s) => Some(CellValue::Text(s.clone())),
            Data::Bool(b) => Some(CellValue::Bool(*b)),
            Data::Error(e) => Some(CellValue::Error(e.to_string())),
            other => Some(CellValue::Date(other.to_string())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) | CellValue::Date(s) | CellValue::Error(s) => f.write_str(s),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One worksheet as a sparse grid of non-empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Stores a value at a zero-based position.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    pub fn with_cell(mut self, row: u32, col: u32, value: CellValue) -> Self {
        self.set(row, col, value);
        self
    }

    /// Value at a zero-based position, `None` for blank cells.
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Value at a 1-based row and a column letter; malformed references read
    /// as blank.
    pub fn cell(&self, row: u32, column: &str) -> Option<&CellValue> {
        match cell_position(row, column) {
            Ok((r, c)) => self.get(r, c),
            Err(e) => {
                warn!("Sheet '{}': {}", self.name, e);
                None
            }
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut sheet = Sheet::new(name);
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.cells() {
            if let Some(value) = CellValue::from_data(data) {
                sheet.set(row_offset + row as u32, col_offset + col as u32, value);
            }
        }
        sheet
    }
}

/// Ordered sheets of one uploaded workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A loaded workbook together with the layout its extension selected.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWorkbook {
    pub workbook: Workbook,
    pub layout: LayoutKey,
}

pub struct WorkbookLoader {
    max_upload_bytes: usize,
}

impl Default for WorkbookLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl WorkbookLoader {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    pub fn load(&self, upload: &Upload) -> Result<LoadedWorkbook> {
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(IpoReadinessError::UploadTooLarge {
                filename: upload.filename.clone(),
                size: upload.bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let layout = upload.layout_key();
        let cursor = Cursor::new(upload.bytes.as_slice());

        let workbook = match layout {
            LayoutKey::Legacy => {
                let mut book: Xls<_> =
                    open_workbook_from_rs(cursor).map_err(|e| parse_error(upload, e))?;
                copy_sheets(&mut book, &upload.filename)
            }
            LayoutKey::Standard => {
                let mut book: Xlsx<_> =
                    open_workbook_from_rs(cursor).map_err(|e| parse_error(upload, e))?;
                copy_sheets(&mut book, &upload.filename)
            }
        };

        info!(
            "Loaded '{}' with {} layout, sheets: {:?}",
            upload.filename,
            layout,
            workbook.sheet_names()
        );

        Ok(LoadedWorkbook { workbook, layout })
    }
}

fn parse_error(upload: &Upload, err: impl fmt::Display) -> IpoReadinessError {
    IpoReadinessError::ParseError {
        filename: upload.filename.clone(),
        details: err.to_string(),
    }
}

fn copy_sheets<RS, R>(book: &mut R, filename: &str) -> Workbook
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: fmt::Display,
{
    let mut sheets = Vec::new();
    for name in book.sheet_names() {
        match book.worksheet_range(&name) {
            Ok(range) => {
                let sheet = Sheet::from_range(&name, &range);
                debug!(
                    "Copied sheet '{}' from '{}' ({} non-empty cells)",
                    name,
                    filename,
                    sheet.cell_count()
                );
                sheets.push(sheet);
            }
            Err(e) => warn!("Skipping sheet '{}' in '{}': {}", name, filename, e),
        }
    }
    Workbook { sheets }
}
