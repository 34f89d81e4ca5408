//! 班表シートのレイアウト設定
//!
//! 行・列の位置はすべて1始まり（Excelの表記と同じ）。
//! 固定位置の前提をここに集約し、パーサ側に生の数値を散らさない。

use serde::{Deserialize, Serialize};

/// 附註行の目印（全角スペースを含む）
pub const DEFAULT_FOOTNOTE_MARKER: &str = "附　註";

/// 班表シートの固定レイアウト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetLayout {
    /// タイトル（例: 113年4月班表）のセル行
    pub title_row: u32,
    /// タイトルのセル列
    pub title_column: u32,
    /// 日付（日の数字）の行
    pub day_row: u32,
    /// 星期記号の行
    pub weekday_row: u32,
    /// 灰色の塗りつぶしで假日を示す行
    pub holiday_row: u32,
    /// データ行の開始行
    pub first_data_row: u32,
    /// 工作內容の列
    pub label_column: u32,
    /// 日付列の開始列
    pub first_date_column: u32,
    /// この文字列を含む工作內容の行は読み飛ばす
    pub footnote_marker: String,
}

impl Default for SpreadsheetLayout {
    fn default() -> Self {
        Self {
            title_row: 1,
            title_column: 1,
            day_row: 2,
            weekday_row: 3,
            holiday_row: 2,
            first_data_row: 4,
            label_column: 1,
            first_date_column: 2,
            footnote_marker: DEFAULT_FOOTNOTE_MARKER.to_string(),
        }
    }
}
