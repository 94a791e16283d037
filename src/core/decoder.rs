//! Spreadsheet decoding and encoding.
//!
//! Only the first sheet of a workbook is read. The first row is the header
//! row, every following row becomes a [`Record`] keyed by header. Empty cells
//! are left out of the record and rows without any value are dropped.

use crate::core::Record;
use crate::utils::error::Result;
use calamine::{DataType, Range, Reader, Xls, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Cursor;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SheetFormat {
    /// 依檔案內容判斷格式，不看副檔名
    pub fn detect(buffer: &[u8]) -> Self {
        if buffer.starts_with(ZIP_SIGNATURE) {
            SheetFormat::Xlsx
        } else if buffer.starts_with(OLE_SIGNATURE) {
            SheetFormat::Xls
        } else {
            SheetFormat::Csv
        }
    }
}

pub fn decode_rows(buffer: &[u8]) -> Result<Vec<Record>> {
    match SheetFormat::detect(buffer) {
        SheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(buffer))?;
            let range = workbook.worksheet_range_at(0).transpose()?;
            Ok(range.map(|r| range_to_records(&r)).unwrap_or_default())
        }
        SheetFormat::Xls => {
            let mut workbook: Xls<_> = Xls::new(Cursor::new(buffer))?;
            let range = workbook.worksheet_range_at(0).transpose()?;
            Ok(range.map(|r| range_to_records(&r)).unwrap_or_default())
        }
        SheetFormat::Csv => decode_csv(buffer),
    }
}

fn range_to_records(range: &Range<DataType>) -> Vec<Record> {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => unique_headers(header_row.iter().map(cell_to_header).collect()),
        None => return Vec::new(),
    };

    rows.filter_map(|row| {
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter_map(|(header, cell)| cell_to_value(cell).map(|value| (header.clone(), value)))
            .collect();
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

fn decode_csv(buffer: &[u8]) -> Result<Vec<Record>> {
    let buffer = buffer.strip_prefix(UTF8_BOM).unwrap_or(buffer);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(buffer);

    let headers = unique_headers(reader.headers()?.iter().map(str::to_string).collect());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(header, cell)| (header.clone(), Value::String(cell.to_string())))
            .collect();
        if !record.is_empty() {
            records.push(record);
        }
    }

    Ok(records)
}

/// 空白欄名改成 `__EMPTY`，重複欄名加上 `_1`、`_2` 後綴
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .map(|header| {
            let base = if header.trim().is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn cell_to_header(cell: &DataType) -> String {
    match cell_to_value(cell) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn cell_to_value(cell: &DataType) -> Option<Value> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) if s.is_empty() => None,
        DataType::String(s) => Some(Value::String(s.clone())),
        DataType::Int(i) => Some(Value::from(*i)),
        // 日期儲存格保留 Excel 序號
        DataType::Float(f) | DataType::DateTime(f) => Some(float_to_value(*f)),
        DataType::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}

fn float_to_value(f: f64) -> Value {
    // xlsx 的數字一律以浮點數儲存，整數值還原成整數
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        Value::from(f as i64)
    } else {
        Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string()))
    }
}

/// Writes `rows` into a single-sheet workbook and returns the file bytes.
///
/// The header row is the union of all record keys in first-seen order.
pub fn encode_rows(rows: &[Record], sheet_name: &str) -> Result<Vec<u8>> {
    let columns = collect_columns(rows);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col_idx, header) in columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, column) in columns.iter().enumerate() {
            let col = col_idx as u16;
            match row.get(column) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => {
                    worksheet.write_string(excel_row, col, s)?;
                }
                Some(Value::Number(n)) => {
                    if let Some(f) = n.as_f64() {
                        worksheet.write_number(excel_row, col, f)?;
                    }
                }
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(excel_row, col, *b)?;
                }
                Some(other) => {
                    worksheet.write_string(excel_row, col, &other.to_string())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn collect_columns(rows: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.data.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}
