//! 班表xlsxの読み込み
//!
//! セル値は calamine、塗りつぶし色は [`fill`] で取得し、
//! 1枚の [`RosterSheet`] にまとめる。

pub mod fill;

use crate::error::{RosterError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use roster_cal_common::RosterSheet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// ファイルから班表シートを読み込み
pub fn load_roster(path: &Path) -> Result<RosterSheet> {
    if !path.exists() {
        return Err(RosterError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    read_roster(bytes)
}

/// xlsxバイト列から先頭シートを読み込み
///
/// 塗りつぶし色が読めない場合は書式なしとして続行する。
pub fn read_roster(bytes: Vec<u8>) -> Result<RosterSheet> {
    let fills = match fill::read_fill_colors(Cursor::new(bytes.as_slice())) {
        Ok(fills) => fills,
        Err(e) => {
            warn!("塗りつぶし情報を読み込めません: {}", e);
            Default::default()
        }
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| RosterError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RosterError::Spreadsheet("シートがありません".into()))?
        .map_err(|e| RosterError::Spreadsheet(e.to_string()))?;

    // Range は使用範囲だけを持つので、A1 からの位置に戻す
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let mut rows = vec![Vec::new(); row_offset as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    debug!(rows = rows.len(), fills = fills.len(), "班表シートを読み込み");
    Ok(RosterSheet::from_rows(rows).with_fills(fills))
}

/// セル値を文字列化（整数値の数値は小数点なし）
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
