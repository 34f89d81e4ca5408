//! Roster Calendar Common Library
//!
//! 班表シートから個人の行事曆インポート行を作る変換エンジン。
//! ファイル入出力は持たず、CLIなどの呼び出し側がメモリ上のシートを渡す。

pub mod types;
pub mod layout;
pub mod sheet;
pub mod alias;
pub mod error;
pub mod holiday;
pub mod parser;
pub mod rules;
pub mod export;
pub mod converter;

pub use types::{CalendarRow, ShiftRecord, TimeSlot};
pub use layout::SpreadsheetLayout;
pub use sheet::RosterSheet;
pub use alias::{AbbreviationRule, AbbreviationTable};
pub use error::{Error, Result};
pub use holiday::{HolidayMap, HolidayPolicy, HolidayResolver};
pub use parser::{parse_roster, parse_title, DateColumnIndex, RosterTitle};
pub use rules::TimeRuleEngine;
pub use converter::{convert, Conversion, ConversionOptions};
