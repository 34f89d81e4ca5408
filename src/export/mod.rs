pub mod calendar_csv;

use crate::error::Result;
use roster_cal_common::Conversion;
use std::path::{Path, PathBuf};

pub use calendar_csv::{to_csv_bytes, write_calendar_csv, UTF8_BOM};

/// 出力先の解決（ディレクトリなら既定ファイル名を付ける）
pub fn resolve_output_path(output: Option<&Path>, input: &Path, file_name: &str) -> PathBuf {
    match output {
        Some(output) if output.is_dir() || output.extension().is_none() => output.join(file_name),
        Some(output) => output.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}

/// 変換結果の一覧を表示
pub fn print_preview(conversion: &Conversion) {
    println!(
        "{:<12} {:<4} {:<6} {:<6} {}",
        "日期", "星期", "開始", "結束", "工作內容"
    );
    for record in &conversion.records {
        println!(
            "{:<12} {:<4} {:<6} {:<6} {}{}",
            record.date,
            record.weekday,
            record.start_time().unwrap_or("-"),
            record.end_time().unwrap_or("-"),
            record.display_label,
            if record.derived { " (追加)" } else { "" }
        );
    }
}

/// 変換結果をCSVに書き出して出力パスを返す
pub fn export_conversion(conversion: &Conversion, output: Option<&Path>, input: &Path) -> Result<PathBuf> {
    let output_path = resolve_output_path(output, input, &conversion.file_name());
    println!("- CSVを生成中...");
    write_calendar_csv(&conversion.rows(), &output_path, &conversion.staff_code)?;
    println!("✔ CSV出力: {}", output_path.display());
    Ok(output_path)
}
