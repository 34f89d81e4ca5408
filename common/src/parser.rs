//! 班表グリッドパーサー
//!
//! 1. タイトルセルから民國年・月を取得
//! 2. 日付行・星期行から (日付, 星期) ⇔ 列 の対応表を作成
//! 3. データ行を走査し、代號を含むセルを ShiftRecord として抽出

use crate::error::{Error, Result};
use crate::layout::SpreadsheetLayout;
use crate::sheet::RosterSheet;
use crate::types::ShiftRecord;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// 民國年 → 西暦 のオフセット
pub const ERA_OFFSET: i32 = 1911;

/// 班表タイトルから得た年月
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterTitle {
    /// 西暦年
    pub year: i32,
    pub month: u32,
}

impl RosterTitle {
    /// 民國年
    pub fn era_year(&self) -> i32 {
        self.year - ERA_OFFSET
    }

    /// 出力ファイル名用の `YYYYMM`
    pub fn year_month(&self) -> String {
        format!("{}{:02}", self.year, self.month)
    }
}

/// 日付列1本分の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateColumn {
    /// シート列番号（1始まり）
    pub column: u32,
    /// YYYY-MM-DD
    pub date: String,
    pub weekday: String,
}

/// (日付, 星期) → シート列番号
#[derive(Debug, Clone, Default)]
pub struct DateColumnIndex {
    columns: HashMap<(String, String), u32>,
}

impl DateColumnIndex {
    pub fn from_columns(columns: &[DateColumn]) -> Self {
        let columns = columns
            .iter()
            .map(|c| ((c.date.clone(), c.weekday.clone()), c.column))
            .collect();
        Self { columns }
    }

    pub fn column_of(&self, date: &str, weekday: &str) -> Option<u32> {
        self.columns
            .get(&(date.to_string(), weekday.trim().to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 解析済みの班表見出し
#[derive(Debug, Clone)]
pub struct ParsedRoster {
    pub title: RosterTitle,
    pub columns: Vec<DateColumn>,
    pub index: DateColumnIndex,
}

/// タイトル文字列から年月を取得
///
/// # Examples
/// ```
/// use roster_cal_common::parser::parse_title;
///
/// let title = parse_title("113年4月班表").unwrap();
/// assert_eq!((title.year, title.month), (2024, 4));
/// ```
pub fn parse_title(text: &str) -> Result<RosterTitle> {
    lazy_static::lazy_static! {
        static ref TITLE_RE: Regex = Regex::new(r"(\d{2,3})年(\d{1,2})月").unwrap();
    }

    let caps = TITLE_RE
        .captures(text)
        .ok_or_else(|| Error::TitleFormat(text.to_string()))?;

    let era_year: i32 = caps[1]
        .parse()
        .map_err(|_| Error::TitleFormat(text.to_string()))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| Error::TitleFormat(text.to_string()))?;

    if !(1..=12).contains(&month) {
        return Err(Error::TitleFormat(text.to_string()));
    }

    Ok(RosterTitle {
        year: era_year + ERA_OFFSET,
        month,
    })
}

/// 日の数字セルを解釈（空白や結合セルの残りは None）
fn parse_day(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// 日付行・星期行から日付列を列挙（列順を保持）
pub fn parse_date_columns(
    sheet: &RosterSheet,
    layout: &SpreadsheetLayout,
    title: &RosterTitle,
) -> Vec<DateColumn> {
    let mut columns = Vec::new();

    for column in layout.first_date_column..=sheet.max_column() {
        let Some(day) = parse_day(sheet.cell(layout.day_row, column)) else {
            continue;
        };

        let Some(date) = NaiveDate::from_ymd_opt(title.year, title.month, day) else {
            debug!(column, day, "存在しない日付のためスキップ");
            continue;
        };

        columns.push(DateColumn {
            column,
            date: date.format("%Y-%m-%d").to_string(),
            weekday: sheet.cell(layout.weekday_row, column).trim().to_string(),
        });
    }

    columns
}

/// タイトルと日付見出しを解析
pub fn parse_roster(sheet: &RosterSheet, layout: &SpreadsheetLayout) -> Result<ParsedRoster> {
    let title = parse_title(sheet.cell(layout.title_row, layout.title_column))?;
    let columns = parse_date_columns(sheet, layout, &title);
    let index = DateColumnIndex::from_columns(&columns);

    debug!(
        year = title.year,
        month = title.month,
        date_columns = columns.len(),
        "班表見出しを解析"
    );

    Ok(ParsedRoster {
        title,
        columns,
        index,
    })
}

/// 読み飛ばす工作內容か（空・"nan"・附註）
fn is_skipped_label(label: &str, layout: &SpreadsheetLayout) -> bool {
    label.is_empty()
        || label.eq_ignore_ascii_case("nan")
        || (!layout.footnote_marker.is_empty() && label.contains(&layout.footnote_marker))
}

/// 代號を含むセルを走査して勤務レコードを抽出
///
/// 代號は部分一致で判定する（"C" は "C2" にも一致する）。
pub fn scan_staff_code(
    sheet: &RosterSheet,
    layout: &SpreadsheetLayout,
    columns: &[DateColumn],
    staff_code: &str,
) -> Vec<ShiftRecord> {
    let mut records = Vec::new();

    for row in layout.first_data_row..=sheet.row_count() {
        let label = sheet.cell(row, layout.label_column).trim();
        if is_skipped_label(label, layout) {
            debug!(row, label, "工作內容なしの行をスキップ");
            continue;
        }

        for date_column in columns {
            if sheet.cell(row, date_column.column).contains(staff_code) {
                records.push(ShiftRecord::new(
                    date_column.date.clone(),
                    date_column.weekday.clone(),
                    label,
                    date_column.column,
                ));
            }
        }
    }

    records
}
