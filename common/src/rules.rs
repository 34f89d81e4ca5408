//! 時刻ルールエンジン
//!
//! 工作內容（原文）・星期・假日フラグから開始/終了時刻を決める。
//!
//! ## 評価順
//! 1. `TimeRule` の一覧を上から評価し、最初にトリガーが一致したルールで確定
//!    （時刻が得られなくても後続ルールは評価しない）
//! 2. 假日の上書きルール（非常班の三班制）
//! 3. 平日の派生勤務ルール（走査完了後に末尾へ追加）

use crate::types::{ShiftRecord, TimeSlot};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

lazy_static::lazy_static! {
    static ref EMBEDDED_TIME_RE: Regex = Regex::new(r"\((\d{1,2}:\d{2})-(\d{1,2}:\d{2})\)").unwrap();
}

/// 工作內容に埋め込まれた `(H:MM-H:MM)` を取り出す
pub fn embedded_time(content: &str) -> Option<TimeSlot> {
    EMBEDDED_TIME_RE
        .captures(content)
        .map(|caps| TimeSlot::new(&caps[1], &caps[2]))
}

/// ルールの発火条件（工作內容の部分一致）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// キーワードを含む
    Contains(String),
    /// いずれかを含む
    ContainsAny(Vec<String>),
    /// すべてを含む
    ContainsAll(Vec<String>),
}

impl Trigger {
    pub fn contains(keyword: &str) -> Self {
        Trigger::Contains(keyword.to_string())
    }

    pub fn any(keywords: &[&str]) -> Self {
        Trigger::ContainsAny(keywords.iter().map(|k| k.to_string()).collect())
    }

    pub fn all(keywords: &[&str]) -> Self {
        Trigger::ContainsAll(keywords.iter().map(|k| k.to_string()).collect())
    }

    pub fn matches(&self, content: &str) -> bool {
        match self {
            Trigger::Contains(k) => content.contains(k.as_str()),
            Trigger::ContainsAny(ks) => ks.iter().any(|k| content.contains(k.as_str())),
            Trigger::ContainsAll(ks) => ks.iter().all(|k| content.contains(k.as_str())),
        }
    }
}

/// キーワード → 時刻 の対応（表の順に最初の一致を採用）
pub type KeywordSlots = Vec<(String, TimeSlot)>;

fn keyword_slots(entries: &[(&str, &str, &str)]) -> KeywordSlots {
    entries
        .iter()
        .map(|&(k, start, end)| (k.to_string(), TimeSlot::new(start, end)))
        .collect()
}

fn first_keyword_slot(slots: &KeywordSlots, text: &str) -> Option<TimeSlot> {
    slots
        .iter()
        .find(|(keyword, _)| text.contains(keyword.as_str()))
        .map(|(_, slot)| slot.clone())
}

/// トリガー一致時の時刻の決め方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeEffect {
    /// 假日/平日で固定時刻を切り替える
    ByHoliday { holiday: TimeSlot, workday: TimeSlot },
    /// 工作內容の `(H:MM-H:MM)` をそのまま使う
    Embedded,
    /// 上午・下午などの時段キーワードで決める
    ByPeriod(KeywordSlots),
    /// 星期記号で決める（表にない星期は空欄）
    ByWeekday(KeywordSlots),
    /// 常に固定時刻
    Fixed(TimeSlot),
}

impl TimeEffect {
    pub fn resolve(&self, content: &str, weekday: &str, is_holiday: bool) -> Option<TimeSlot> {
        match self {
            TimeEffect::ByHoliday { holiday, workday } => {
                Some(if is_holiday { holiday.clone() } else { workday.clone() })
            }
            TimeEffect::Embedded => embedded_time(content),
            TimeEffect::ByPeriod(slots) => first_keyword_slot(slots, content),
            TimeEffect::ByWeekday(slots) => slots
                .iter()
                .find(|(symbol, _)| symbol == weekday.trim())
                .map(|(_, slot)| slot.clone()),
            TimeEffect::Fixed(slot) => Some(slot.clone()),
        }
    }
}

/// 優先順位付きの時刻ルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRule {
    pub name: String,
    pub trigger: Trigger,
    pub effect: TimeEffect,
}

impl TimeRule {
    pub fn new(name: &str, trigger: Trigger, effect: TimeEffect) -> Self {
        Self {
            name: name.to_string(),
            trigger,
            effect,
        }
    }
}

/// 假日のみ適用する上書きルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayOverride {
    pub trigger: String,
    pub periods: KeywordSlots,
}

/// 平日に別勤務を派生させるルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedShift {
    pub trigger: String,
    pub label: String,
    pub slot: TimeSlot,
}

/// 非常班（夜間・假日の諮詢與藥動服務）の工作內容
pub const EXTRA_SHIFT_LABEL: &str = "非常班之諮詢與藥動服務";

/// 平日に非常班を派生させる工作內容
pub const WARD_REVIEW_TRIGGER: &str = "處方判讀 7-住院";

/// 時刻ルールエンジン
#[derive(Debug, Clone)]
pub struct TimeRuleEngine {
    rules: Vec<TimeRule>,
    overrides: Vec<HolidayOverride>,
    derived: Vec<DerivedShift>,
}

impl Default for TimeRuleEngine {
    fn default() -> Self {
        Self::pharmacy_rules()
    }
}

impl TimeRuleEngine {
    pub fn new(rules: Vec<TimeRule>, overrides: Vec<HolidayOverride>, derived: Vec<DerivedShift>) -> Self {
        Self {
            rules,
            overrides,
            derived,
        }
    }

    /// 藥劑部班表の時刻ルール
    fn pharmacy_rules() -> Self {
        let rules = vec![
            TimeRule::new(
                "調劑複核",
                Trigger::contains("調劑複核"),
                TimeEffect::ByHoliday {
                    holiday: TimeSlot::new("11:00", "15:00"),
                    workday: TimeSlot::new("13:30", "15:00"),
                },
            ),
            TimeRule::new("門診藥局調劑", Trigger::contains("門診藥局調劑"), TimeEffect::Embedded),
            TimeRule::new("中2藥局", Trigger::contains("中2藥局"), TimeEffect::Embedded),
            TimeRule::new(
                "處方判讀・諮詢",
                Trigger::any(&["處方判讀", "化療處方判讀", "藥物諮詢", "PreESRD"]),
                TimeEffect::ByPeriod(keyword_slots(&[
                    ("上午", "08:00", "12:00"),
                    ("下午", "13:30", "17:30"),
                    ("小夜1hr", "17:30", "18:30"),
                    ("小夜", "17:30", "21:30"),
                ])),
            ),
            TimeRule::new(
                "抗凝藥師門診",
                Trigger::contains("抗凝藥師門診"),
                TimeEffect::ByWeekday(keyword_slots(&[
                    ("二", "08:30", "12:00"),
                    ("三", "13:30", "17:00"),
                ])),
            ),
            TimeRule::new(
                "移植藥師門診",
                Trigger::all(&["移植藥師門診", "上午"]),
                TimeEffect::Fixed(TimeSlot::new("08:30", "12:00")),
            ),
            TimeRule::new(
                "中藥局調劑",
                Trigger::contains("中藥局調劑"),
                TimeEffect::Fixed(TimeSlot::new("08:30", "12:00")),
            ),
            TimeRule::new(
                "瑞德西偉審核",
                Trigger::contains("瑞德西偉審核"),
                TimeEffect::Fixed(TimeSlot::new("08:00", "20:00")),
            ),
        ];

        let overrides = vec![HolidayOverride {
            trigger: EXTRA_SHIFT_LABEL.to_string(),
            periods: keyword_slots(&[
                ("上午", "08:00", "12:30"),
                ("下午", "12:30", "17:00"),
                ("晚上", "17:00", "21:00"),
            ]),
        }];

        let derived = vec![DerivedShift {
            trigger: WARD_REVIEW_TRIGGER.to_string(),
            label: EXTRA_SHIFT_LABEL.to_string(),
            slot: TimeSlot::new("17:30", "21:30"),
        }];

        Self::new(rules, overrides, derived)
    }

    pub fn rules(&self) -> &[TimeRule] {
        &self.rules
    }

    /// トリガーが最初に一致するルール
    pub fn first_match(&self, content: &str) -> Option<&TimeRule> {
        self.rules.iter().find(|rule| rule.trigger.matches(content))
    }

    /// 1件分の時刻を決める（派生勤務は作らない）
    pub fn assign(&self, record: &ShiftRecord, is_holiday: bool) -> Option<TimeSlot> {
        let content = record.raw_content.as_str();

        let chained = self.first_match(content).and_then(|rule| {
            let slot = rule.effect.resolve(content, &record.weekday, is_holiday);
            debug!(rule = %rule.name, date = %record.date, matched = slot.is_some(), "時刻ルール一致");
            slot
        });

        let overridden = if is_holiday {
            self.overrides
                .iter()
                .filter(|o| content.contains(o.trigger.as_str()))
                .find_map(|o| first_keyword_slot(&o.periods, content))
        } else {
            None
        };

        overridden.or(chained)
    }

    /// 全レコードに時刻を割り当て、派生勤務を末尾に追加する
    ///
    /// 時刻が設定済みのレコードは変更しない。派生勤務は発生元レコード1件につき
    /// 1件で、発生元ごとの派生勤務がすでにあれば追加しないので、
    /// 繰り返し適用しても結果は変わらない。
    /// 戻り値は追加した派生勤務の件数。
    pub fn apply<F>(&self, records: &mut Vec<ShiftRecord>, is_holiday: F) -> usize
    where
        F: Fn(&ShiftRecord) -> bool,
    {
        // (日付, 発生元, 派生ラベル) → 既存の派生勤務の件数
        let mut existing: HashMap<(String, String, String), usize> = HashMap::new();
        for record in records.iter().filter(|r| r.derived) {
            if let Some(source) = &record.derived_from {
                *existing
                    .entry((record.date.clone(), source.clone(), record.raw_content.clone()))
                    .or_default() += 1;
            }
        }

        let mut extra: Vec<ShiftRecord> = Vec::new();

        for record in records.iter_mut() {
            if record.derived {
                continue;
            }

            let holiday = is_holiday(&*record);

            if record.slot.is_none() {
                record.slot = self.assign(record, holiday);
            }

            if holiday {
                continue;
            }

            for rule in &self.derived {
                if !record.raw_content.contains(rule.trigger.as_str()) {
                    continue;
                }

                let key = (record.date.clone(), record.raw_content.clone(), rule.label.clone());
                if let Some(count) = existing.get_mut(&key).filter(|c| **c > 0) {
                    *count -= 1;
                    continue;
                }

                let mut shift = ShiftRecord::new(
                    record.date.clone(),
                    record.weekday.clone(),
                    rule.label.clone(),
                    record.column,
                );
                shift.display_label = rule.label.clone();
                shift.slot = Some(rule.slot.clone());
                shift.derived = true;
                shift.derived_from = Some(record.raw_content.clone());
                extra.push(shift);
            }
        }

        let added = extra.len();
        records.extend(extra);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, weekday: &str) -> ShiftRecord {
        ShiftRecord::new("2024-04-02", weekday, content, 3)
    }

    fn times(engine: &TimeRuleEngine, content: &str, weekday: &str, holiday: bool) -> Option<(String, String)> {
        engine
            .assign(&record(content, weekday), holiday)
            .map(|s| (s.start, s.end))
    }

    fn pair(start: &str, end: &str) -> Option<(String, String)> {
        Some((start.to_string(), end.to_string()))
    }

    #[test]
    fn test_embedded_time() {
        assert_eq!(embedded_time("門診藥局調劑(9:00-11:00)"), Some(TimeSlot::new("9:00", "11:00")));
        assert_eq!(embedded_time("門診藥局調劑"), None);
    }

    #[test]
    fn test_dispensing_double_check() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "調劑複核", "二", false), pair("13:30", "15:00"));
        assert_eq!(times(&engine, "調劑複核", "六", true), pair("11:00", "15:00"));
    }

    #[test]
    fn test_outpatient_embedded_time_literal() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "門診藥局調劑(09:00-11:00)", "一", false), pair("09:00", "11:00"));
        assert_eq!(times(&engine, "門診藥局調劑(8:00-12:00)", "一", false), pair("8:00", "12:00"));
        // 時刻注記がなければ空欄（後続ルールは評価しない）
        assert_eq!(times(&engine, "門診藥局調劑 上午", "一", false), None);
    }

    #[test]
    fn test_ward_dispensing_embedded_time() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "中2藥局發藥(12:30-17:30)", "四", false), pair("12:30", "17:30"));
    }

    #[test]
    fn test_period_rules() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "處方判讀 上午", "一", false), pair("08:00", "12:00"));
        assert_eq!(times(&engine, "化療處方判讀 下午", "一", false), pair("13:30", "17:30"));
        assert_eq!(times(&engine, "藥物諮詢 小夜1hr", "一", false), pair("17:30", "18:30"));
        assert_eq!(times(&engine, "PreESRD 小夜", "一", false), pair("17:30", "21:30"));
        assert_eq!(times(&engine, "處方判讀 7-住院", "一", false), None);
    }

    #[test]
    fn test_period_table_order() {
        let engine = TimeRuleEngine::default();
        // 上午が先に評価される
        assert_eq!(times(&engine, "藥物諮詢 上午/小夜", "一", false), pair("08:00", "12:00"));
    }

    #[test]
    fn test_anticoagulation_by_weekday() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "抗凝藥師門診", "二", false), pair("08:30", "12:00"));
        assert_eq!(times(&engine, "抗凝藥師門診", "三", false), pair("13:30", "17:00"));
        assert_eq!(times(&engine, "抗凝藥師門診", "四", false), None);
    }

    #[test]
    fn test_transplant_requires_morning() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "移植藥師門診 上午", "一", false), pair("08:30", "12:00"));
        assert_eq!(times(&engine, "移植藥師門診 下午", "一", false), None);
    }

    #[test]
    fn test_fixed_rules() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "中藥局調劑", "三", false), pair("08:30", "12:00"));
        assert_eq!(times(&engine, "瑞德西偉審核", "日", true), pair("08:00", "20:00"));
        assert_eq!(times(&engine, "庫存盤點", "一", false), None);
    }

    #[test]
    fn test_first_match_wins() {
        let engine = TimeRuleEngine::default();
        assert_eq!(engine.first_match("調劑複核 門診藥局調劑(9:00-10:00)").unwrap().name, "調劑複核");
        assert_eq!(times(&engine, "調劑複核 門診藥局調劑(9:00-10:00)", "一", false), pair("13:30", "15:00"));
    }

    #[test]
    fn test_extra_shift_holiday_override() {
        let engine = TimeRuleEngine::default();
        assert_eq!(times(&engine, "非常班之諮詢與藥動服務 上午", "六", true), pair("08:00", "12:30"));
        assert_eq!(times(&engine, "非常班之諮詢與藥動服務 下午", "六", true), pair("12:30", "17:00"));
        assert_eq!(times(&engine, "非常班之諮詢與藥動服務 晚上", "日", true), pair("17:00", "21:00"));
        // 平日は上書きしない
        assert_eq!(times(&engine, "非常班之諮詢與藥動服務 上午", "一", false), None);
    }

    #[test]
    fn test_derived_shift_on_workday() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![record("處方判讀 7-住院", "二")];

        let added = engine.apply(&mut records, |_| false);

        assert_eq!(added, 1);
        assert_eq!(records.len(), 2);
        let derived = &records[1];
        assert!(derived.derived);
        assert_eq!(derived.raw_content, EXTRA_SHIFT_LABEL);
        assert_eq!(derived.date, "2024-04-02");
        assert_eq!(derived.weekday, "二");
        assert_eq!(derived.start_time(), Some("17:30"));
        assert_eq!(derived.end_time(), Some("21:30"));
    }

    #[test]
    fn test_derived_shift_per_source_record() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![
            ShiftRecord::new("2024-04-08", "一", "處方判讀 7-住院 上午", 2),
            ShiftRecord::new("2024-04-08", "一", "處方判讀 7-住院 下午", 2),
        ];

        let added = engine.apply(&mut records, |_| false);

        assert_eq!(added, 2);
        assert_eq!(records.len(), 4);
        let sources: Vec<Option<&str>> = records[2..].iter().map(|r| r.derived_from.as_deref()).collect();
        assert_eq!(sources, vec![Some("處方判讀 7-住院 上午"), Some("處方判讀 7-住院 下午")]);

        // 再適用しても増えない
        assert_eq!(engine.apply(&mut records, |_| false), 0);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_derived_shift_for_repeated_source_rows() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![
            ShiftRecord::new("2024-04-08", "一", "處方判讀 7-住院", 2),
            ShiftRecord::new("2024-04-08", "一", "處方判讀 7-住院", 2),
        ];

        assert_eq!(engine.apply(&mut records, |_| false), 2);
        assert_eq!(engine.apply(&mut records, |_| false), 0);
        assert_eq!(records.iter().filter(|r| r.derived).count(), 2);
    }

    #[test]
    fn test_no_derived_shift_on_holiday() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![record("處方判讀 7-住院", "六")];
        assert_eq!(engine.apply(&mut records, |_| true), 0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_apply_twice_is_stable() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![
            record("處方判讀 7-住院", "二"),
            record("調劑複核", "二"),
            record("門診藥局調劑(09:00-11:00)", "二"),
        ];

        engine.apply(&mut records, |_| false);
        let first = records.clone();
        let added = engine.apply(&mut records, |_| false);

        assert_eq!(added, 0);
        assert_eq!(records, first);
    }

    #[test]
    fn test_apply_keeps_existing_times() {
        let engine = TimeRuleEngine::default();
        let mut timed = record("調劑複核", "二");
        timed.slot = Some(TimeSlot::new("07:00", "09:00"));
        let mut records = vec![timed];

        engine.apply(&mut records, |_| true);
        assert_eq!(records[0].start_time(), Some("07:00"));
    }

    #[test]
    fn test_apply_uses_holiday_per_record() {
        let engine = TimeRuleEngine::default();
        let mut records = vec![record("調劑複核", "五"), record("調劑複核", "六")];
        engine.apply(&mut records, |r| r.weekday == "六");
        assert_eq!(records[0].start_time(), Some("13:30"));
        assert_eq!(records[1].start_time(), Some("11:00"));
    }

    #[test]
    fn test_custom_engine() {
        let engine = TimeRuleEngine::new(
            vec![TimeRule::new(
                "盤點",
                Trigger::contains("盤點"),
                TimeEffect::Fixed(TimeSlot::new("16:00", "17:00")),
            )],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(engine.rules().len(), 1);
        assert_eq!(times(&engine, "庫存盤點", "一", false), pair("16:00", "17:00"));
        assert_eq!(times(&engine, "調劑複核", "一", false), None);
    }
}
