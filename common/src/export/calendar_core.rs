//! 行事曆インポート形式への射影
//!
//! Subject, Start Date, Start Time, End Date, End Time の固定5列。
//! 時刻のないレコードも空欄のまま出力する。

use crate::parser::RosterTitle;
use crate::types::{CalendarRow, ShiftRecord};

/// CSVの列名（この順で出力）
pub const CALENDAR_HEADERS: [&str; 5] = ["Subject", "Start Date", "Start Time", "End Date", "End Time"];

impl From<&ShiftRecord> for CalendarRow {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            subject: record.display_label.clone(),
            start_date: record.date.clone(),
            start_time: record.start_time().unwrap_or_default().to_string(),
            end_date: record.date.clone(),
            end_time: record.end_time().unwrap_or_default().to_string(),
        }
    }
}

/// 勤務レコード → CSV行（行の除外はしない）
pub fn project(records: &[ShiftRecord]) -> Vec<CalendarRow> {
    records.iter().map(CalendarRow::from).collect()
}

/// 出力ファイル名: `<yyyy><mm>個人班表(<代號>).csv`
pub fn output_file_name(title: &RosterTitle, staff_code: &str) -> String {
    format!("{}個人班表({}).csv", title.year_month(), staff_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeSlot;

    #[test]
    fn test_project_timed_record() {
        let mut record = ShiftRecord::new("2024-04-01", "一", "門診藥局調劑(09:00-11:00)", 2);
        record.display_label = "門診".into();
        record.slot = Some(TimeSlot::new("09:00", "11:00"));

        let rows = project(&[record]);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            CalendarRow {
                subject: "門診".into(),
                start_date: "2024-04-01".into(),
                start_time: "09:00".into(),
                end_date: "2024-04-01".into(),
                end_time: "11:00".into(),
            }
        );
    }

    #[test]
    fn test_project_keeps_untimed_rows() {
        let mut record = ShiftRecord::new("2024-04-04", "四", "抗凝藥師門診", 5);
        record.display_label = "抗凝門診".into();

        let rows = project(&[record]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_time, "");
        assert_eq!(rows[0].end_time, "");
        assert_eq!(rows[0].end_date, "2024-04-04");
    }

    #[test]
    fn test_output_file_name() {
        let title = RosterTitle { year: 2024, month: 4 };
        assert_eq!(output_file_name(&title, "A1"), "202404個人班表(A1).csv");
    }
}
