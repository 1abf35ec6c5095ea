// Reading the table from an Excel export.

use std::fs;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use framing_shift::GroupYearRecord;
use log::debug;
use snafu::prelude::*;

use crate::dash::config_reader::Columns;
use crate::dash::io_common::ColumnIndex;
use crate::dash::*;

pub fn read_xlsx_records(
    path: &str,
    worksheet_name: Option<&str>,
    columns: &Columns,
) -> DashResult<Vec<GroupYearRecord>> {
    fs::metadata(path).context(DataUnavailableSnafu { path })?;
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu { path })?
    .context(OpeningExcelSnafu { path })?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(EmptyExcelSnafu { path })?;
    let mut header: Vec<String> = Vec::new();
    for cell in header_row.iter() {
        header.push(read_cell(cell, 1, path)?);
    }
    debug!("read_xlsx_records: header: {:?}", header);
    let idx = ColumnIndex::from_header(&header, columns, path)?;

    let mut res: Vec<GroupYearRecord> = Vec::new();
    for (i, row) in rows.enumerate() {
        let lineno = i + 2;
        let mut cells: Vec<String> = Vec::new();
        for cell in row.iter() {
            cells.push(read_cell(cell, lineno, path)?);
        }
        // Trailing empty rows of the worksheet.
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        res.push(idx.read_record(&cells, lineno, path)?);
    }
    debug!("read_xlsx_records: {} records from {:?}", res.len(), path);
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize, path: &str) -> DashResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
