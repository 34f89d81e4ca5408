//! Google行事曆インポート用CSVの書き出し

use crate::error::{RosterError, Result};
use roster_cal_common::export::CALENDAR_HEADERS;
use roster_cal_common::CalendarRow;
use std::path::Path;

/// UTF-8 BOM（表計算ソフトでの文字化け防止）
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 行事曆行をBOM付きCSVバイト列に変換
pub fn to_csv_bytes(rows: &[CalendarRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(CALENDAR_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.subject.as_str(),
            row.start_date.as_str(),
            row.start_time.as_str(),
            row.end_date.as_str(),
            row.end_time.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|e| RosterError::Io(e.into_error()))
}

/// CSVファイルを書き出し（0行なら書き出さない）
pub fn write_calendar_csv(rows: &[CalendarRow], path: &Path, staff_code: &str) -> Result<()> {
    if rows.is_empty() {
        return Err(RosterError::EmptyResult(staff_code.to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_csv_bytes(rows)?)?;
    Ok(())
}
