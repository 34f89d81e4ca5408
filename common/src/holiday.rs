//! 假日判定モジュール
//!
//! 日付行セルの灰色塗りつぶしから假日列を判定する。
//! 星期（六・日）だけで判定する簡易方式も選択できるが、
//! 1回の変換で両方を混ぜることはしない。

use crate::parser::DateColumnIndex;
use crate::layout::SpreadsheetLayout;
use crate::sheet::RosterSheet;
use crate::types::ShiftRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 既定の假日塗りつぶし色
pub const DEFAULT_HOLIDAY_FILL: &str = "D9D9D9";

/// 星期方式で假日とみなす記号
pub const WEEKEND_SYMBOLS: &[&str] = &["六", "日"];

/// RGB文字列を `RRGGBB`（大文字）に正規化
///
/// `#` 付き、ARGB（先頭2桁がアルファ）の両方を受け付ける。
pub fn normalize_rgb(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = match hex.len() {
        8 => &hex[2..],
        6 => hex,
        _ => return None,
    };
    Some(hex.to_ascii_uppercase())
}

/// 列番号 → 假日フラグ
#[derive(Debug, Clone, Default)]
pub struct HolidayMap {
    flags: BTreeMap<u32, bool>,
}

impl HolidayMap {
    /// 假日行の塗りつぶし色から作成
    ///
    /// 書式情報がないセルは平日扱い。
    pub fn build(sheet: &RosterSheet, layout: &SpreadsheetLayout, gray_colors: &[String]) -> Self {
        let grays: Vec<String> = gray_colors.iter().filter_map(|c| normalize_rgb(c)).collect();

        if !sheet.has_style_info() {
            warn!("塗りつぶし情報がないため、すべての日を平日として扱います");
        }

        let mut flags = BTreeMap::new();
        for column in layout.first_date_column..=sheet.max_column() {
            let is_gray = sheet
                .fill(layout.holiday_row, column)
                .and_then(normalize_rgb)
                .map(|rgb| grays.contains(&rgb))
                .unwrap_or(false);
            flags.insert(column, is_gray);
        }

        debug!(
            holidays = flags.values().filter(|&&h| h).count(),
            columns = flags.len(),
            "假日マップを作成"
        );

        Self { flags }
    }

    pub fn is_holiday(&self, column: u32) -> bool {
        self.flags.get(&column).copied().unwrap_or(false)
    }

    /// 假日の列番号（昇順）
    pub fn holiday_columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.flags.iter().filter(|(_, h)| **h).map(|(c, _)| *c)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// 假日の判定方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayPolicy {
    /// 日付行の灰色塗りつぶし（既定）
    #[default]
    FillColor,
    /// 星期が六・日なら假日
    Weekday,
}

impl std::str::FromStr for HolidayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fill" | "fill_color" | "color" => Ok(HolidayPolicy::FillColor),
            "weekday" | "weekend" => Ok(HolidayPolicy::Weekday),
            _ => Err(format!("Unknown holiday policy: {}. Use fill or weekday", s)),
        }
    }
}

impl std::fmt::Display for HolidayPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolidayPolicy::FillColor => write!(f, "fill"),
            HolidayPolicy::Weekday => write!(f, "weekday"),
        }
    }
}

/// 勤務レコードの假日判定
#[derive(Debug, Clone)]
pub struct HolidayResolver {
    policy: HolidayPolicy,
    map: HolidayMap,
    index: DateColumnIndex,
}

impl HolidayResolver {
    pub fn new(policy: HolidayPolicy, map: HolidayMap, index: DateColumnIndex) -> Self {
        Self { policy, map, index }
    }

    /// 星期方式（塗りつぶし情報を使わない）
    pub fn weekday_only() -> Self {
        Self::new(HolidayPolicy::Weekday, HolidayMap::default(), DateColumnIndex::default())
    }

    pub fn policy(&self) -> HolidayPolicy {
        self.policy
    }

    pub fn map(&self) -> &HolidayMap {
        &self.map
    }

    /// (日付, 星期) → 列 → 假日フラグ。列が見つからなければ平日
    pub fn is_holiday(&self, record: &ShiftRecord) -> bool {
        match self.policy {
            HolidayPolicy::FillColor => self
                .index
                .column_of(&record.date, &record.weekday)
                .map(|column| self.map.is_holiday(column))
                .unwrap_or(false),
            HolidayPolicy::Weekday => WEEKEND_SYMBOLS.contains(&record.weekday.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DateColumn;

    fn header_sheet() -> RosterSheet {
        let mut sheet = RosterSheet::from_rows(vec![
            vec!["113年4月班表".into()],
            vec!["".into(), "5".into(), "6".into(), "7".into(), "8".into()],
            vec!["".into(), "五".into(), "六".into(), "日".into(), "一".into()],
        ]);
        sheet.set_fill(2, 2, "FFD9D9D9");
        sheet.set_fill(2, 3, "FFD9D9D9");
        sheet.set_fill(2, 4, "FFD8D8D8");
        sheet.set_fill(2, 5, "FFFFFF00");
        sheet
    }

    #[test]
    fn test_normalize_rgb() {
        assert_eq!(normalize_rgb("FFD9D9D9"), Some("D9D9D9".to_string()));
        assert_eq!(normalize_rgb("#d9d9d9"), Some("D9D9D9".to_string()));
        assert_eq!(normalize_rgb("D9D9"), None);
        assert_eq!(normalize_rgb("GGGGGG"), None);
    }

    #[test]
    fn test_build_holiday_map_default_gray() {
        let sheet = header_sheet();
        let map = HolidayMap::build(&sheet, &SpreadsheetLayout::default(), &[DEFAULT_HOLIDAY_FILL.into()]);

        assert!(map.is_holiday(2));
        assert!(map.is_holiday(3));
        // D8D8D8 は既定色ではない
        assert!(!map.is_holiday(4));
        assert!(!map.is_holiday(5));
        assert_eq!(map.holiday_columns().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_build_holiday_map_configured_grays() {
        let sheet = header_sheet();
        let grays = vec!["D9D9D9".to_string(), "d8d8d8".to_string()];
        let map = HolidayMap::build(&sheet, &SpreadsheetLayout::default(), &grays);
        assert_eq!(map.holiday_columns().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_missing_style_info_is_workday() {
        let sheet = RosterSheet::from_rows(vec![
            vec!["113年4月班表".into()],
            vec!["".into(), "6".into(), "7".into()],
        ]);
        let map = HolidayMap::build(&sheet, &SpreadsheetLayout::default(), &[DEFAULT_HOLIDAY_FILL.into()]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.holiday_columns().count(), 0);
        assert!(!map.is_holiday(99));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fill".parse::<HolidayPolicy>().unwrap(), HolidayPolicy::FillColor);
        assert_eq!("Weekday".parse::<HolidayPolicy>().unwrap(), HolidayPolicy::Weekday);
        assert!("both".parse::<HolidayPolicy>().is_err());
        assert_eq!(HolidayPolicy::default().to_string(), "fill");
    }

    #[test]
    fn test_resolver_fill_color() {
        let sheet = header_sheet();
        let map = HolidayMap::build(&sheet, &SpreadsheetLayout::default(), &[DEFAULT_HOLIDAY_FILL.into()]);
        let index = DateColumnIndex::from_columns(&[
            DateColumn { column: 2, date: "2024-04-05".into(), weekday: "五".into() },
            DateColumn { column: 5, date: "2024-04-08".into(), weekday: "一".into() },
        ]);
        let resolver = HolidayResolver::new(HolidayPolicy::FillColor, map, index);

        // 灰色の金曜（清明節など）は假日
        assert!(resolver.is_holiday(&ShiftRecord::new("2024-04-05", "五", "調劑複核", 2)));
        assert!(!resolver.is_holiday(&ShiftRecord::new("2024-04-08", "一", "調劑複核", 5)));
        // 対応表にない組み合わせは平日
        assert!(!resolver.is_holiday(&ShiftRecord::new("2024-04-05", "六", "調劑複核", 2)));
    }

    #[test]
    fn test_resolver_weekday() {
        let resolver = HolidayResolver::weekday_only();
        assert!(resolver.is_holiday(&ShiftRecord::new("2024-04-06", "六", "x", 3)));
        assert!(resolver.is_holiday(&ShiftRecord::new("2024-04-07", "日", "x", 4)));
        assert!(!resolver.is_holiday(&ShiftRecord::new("2024-04-05", "五", "x", 2)));
    }
}
