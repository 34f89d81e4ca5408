//! メモリ上の班表シート
//!
//! セルの表示文字列と塗りつぶし色だけを保持する。
//! ファイル読み込みは呼び出し側（CLIのreader）が済ませてから渡す。

use std::collections::HashMap;

/// 班表シート（1始まりの行・列でアクセス）
#[derive(Debug, Clone, Default)]
pub struct RosterSheet {
    rows: Vec<Vec<String>>,
    /// (行, 列) → RRGGBB（明示的なRGB塗りつぶしのあるセルのみ）
    fills: HashMap<(u32, u32), String>,
}

impl RosterSheet {
    /// 行ごとのセル文字列から作成
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            fills: HashMap::new(),
        }
    }

    /// 塗りつぶし色を設定して返す
    pub fn with_fills(mut self, fills: HashMap<(u32, u32), String>) -> Self {
        self.fills = fills;
        self
    }

    pub fn set_fill(&mut self, row: u32, column: u32, rgb: impl Into<String>) {
        self.fills.insert((row, column), rgb.into());
    }

    /// セルの文字列。範囲外や空セルは空文字
    pub fn cell(&self, row: u32, column: u32) -> &str {
        if row == 0 || column == 0 {
            return "";
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(column as usize - 1))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// セルの塗りつぶし色（書式情報がなければ None）
    pub fn fill(&self, row: u32, column: u32) -> Option<&str> {
        self.fills.get(&(row, column)).map(|s| s.as_str())
    }

    /// 書式情報を1件でも持っているか
    pub fn has_style_info(&self) -> bool {
        !self.fills.is_empty()
    }

    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// 値の入っている最後の列
    pub fn max_column(&self) -> u32 {
        self.rows
            .iter()
            .filter_map(|r| r.iter().rposition(|c| !c.is_empty()))
            .max()
            .map(|i| i as u32 + 1)
            .unwrap_or(0)
    }
}
