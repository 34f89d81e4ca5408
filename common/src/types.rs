//! 班表変換の型定義
//!
//! - ShiftRecord: 班表から抽出した1勤務（代號1件 × 1日）
//! - TimeSlot: 開始・終了時刻のペア
//! - CalendarRow: 行事曆インポートCSVの1行

use serde::{Deserialize, Serialize};

/// 開始・終了時刻（`HH:MM` の壁時計文字列）
///
/// 片方だけが設定された状態を作れないよう、常にペアで保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// 班表から抽出した勤務レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// 日付（YYYY-MM-DD）
    pub date: String,

    /// 星期（見出し行の記号をそのまま使用。dateから再計算しない）
    pub weekday: String,

    /// 工作內容（A欄の原文。括弧内の時刻を含む）
    pub raw_content: String,

    /// 簡化後內容（時刻注記の除去と縮寫置換を適用済み）
    #[serde(default)]
    pub display_label: String,

    /// 割り当て済みの時刻。ルール不一致なら None のまま
    #[serde(default)]
    pub slot: Option<TimeSlot>,

    /// 元のシート列番号（1始まり）
    #[serde(default)]
    pub column: u32,

    /// ルールエンジンが追加した派生勤務か
    #[serde(default)]
    pub derived: bool,

    /// 派生勤務の発生元の工作內容
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

impl ShiftRecord {
    pub fn new(
        date: impl Into<String>,
        weekday: impl Into<String>,
        raw_content: impl Into<String>,
        column: u32,
    ) -> Self {
        Self {
            date: date.into(),
            weekday: weekday.into(),
            raw_content: raw_content.into(),
            column,
            ..Default::default()
        }
    }

    pub fn start_time(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.start.as_str())
    }

    pub fn end_time(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.end.as_str())
    }

    pub fn is_timed(&self) -> bool {
        self.slot.is_some()
    }
}

/// 行事曆インポートCSVの1行
///
/// フィールド順がそのままCSVの列順になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
}
