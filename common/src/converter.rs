//! 変換パイプライン
//!
//! シート → 見出し解析 → 代號の抽出 → 縮寫 → 時刻ルール → 行事曆行
//!
//! 変換ごとに独立した値だけを使い、プロセス全体で共有する状態は持たない。

use crate::alias::AbbreviationTable;
use crate::error::{Error, Result};
use crate::export::{output_file_name, project};
use crate::holiday::{HolidayMap, HolidayPolicy, HolidayResolver, DEFAULT_HOLIDAY_FILL};
use crate::layout::SpreadsheetLayout;
use crate::parser::{parse_roster, scan_staff_code, RosterTitle};
use crate::rules::TimeRuleEngine;
use crate::sheet::RosterSheet;
use crate::types::{CalendarRow, ShiftRecord};
use tracing::debug;

/// 変換オプション（リクエストごとに渡す）
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub layout: SpreadsheetLayout,
    pub abbreviations: AbbreviationTable,
    pub holiday_policy: HolidayPolicy,
    /// 假日とみなす塗りつぶし色（RRGGBB）
    pub holiday_fills: Vec<String>,
    pub engine: TimeRuleEngine,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            layout: SpreadsheetLayout::default(),
            abbreviations: AbbreviationTable::default(),
            holiday_policy: HolidayPolicy::default(),
            holiday_fills: vec![DEFAULT_HOLIDAY_FILL.to_string()],
            engine: TimeRuleEngine::default(),
        }
    }
}

/// 変換結果
#[derive(Debug, Clone)]
pub struct Conversion {
    pub title: RosterTitle,
    pub staff_code: String,
    pub records: Vec<ShiftRecord>,
    pub holiday_policy: HolidayPolicy,
    pub holidays: HolidayMap,
}

impl Conversion {
    /// 行事曆インポート行
    pub fn rows(&self) -> Vec<CalendarRow> {
        project(&self.records)
    }

    pub fn file_name(&self) -> String {
        output_file_name(&self.title, &self.staff_code)
    }

    /// 代號が班表に見つからなかった
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn derived_count(&self) -> usize {
        self.records.iter().filter(|r| r.derived).count()
    }

    pub fn untimed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_timed()).count()
    }
}

/// 1人分の班表を変換
///
/// 代號が見つからない場合はエラーではなく空の結果を返す。
pub fn convert(sheet: &RosterSheet, staff_code: &str, options: &ConversionOptions) -> Result<Conversion> {
    if staff_code.is_empty() {
        return Err(Error::EmptyStaffCode);
    }

    let layout = &options.layout;
    let parsed = parse_roster(sheet, layout)?;

    let mut records = scan_staff_code(sheet, layout, &parsed.columns, staff_code);
    debug!(staff_code, matched = records.len(), "代號を走査");

    let holidays = match options.holiday_policy {
        HolidayPolicy::FillColor => HolidayMap::build(sheet, layout, &options.holiday_fills),
        HolidayPolicy::Weekday => HolidayMap::default(),
    };

    if !records.is_empty() {
        options.abbreviations.apply(&mut records);

        let resolver = HolidayResolver::new(options.holiday_policy, holidays.clone(), parsed.index);
        let scanned = records.len();
        options.engine.apply(&mut records, |r| resolver.is_holiday(r));

        // 派生勤務の件名にも縮寫表を適用
        options.abbreviations.apply(&mut records[scanned..]);
    }

    Ok(Conversion {
        title: parsed.title,
        staff_code: staff_code.to_string(),
        records,
        holiday_policy: options.holiday_policy,
        holidays,
    })
}
